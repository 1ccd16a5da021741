//! # Dictionary Matcher
//!
//! Turns the puzzle's sides and candidate dictionary into three solution
//! sequences:
//!
//! - **one-word**: a word whose letters include every letter of the box.
//!   These words are set aside before the two-word pass.
//! - **two-word**: an ordered pair `(A, B)` from the remaining words where
//!   `A` ends with the letter `B` starts with, and `A ∪ B` uses exactly the
//!   letters of the box.
//! - **perfect**: a solution using every letter exactly once. For a pair,
//!   the shared link letter counts once.
//!
//! The letter universe is mapped onto bits of a `u128`, so each word is
//! profiled once and every pair check is a handful of mask operations.
//! Candidates for `B` are bucketed by first letter, which keeps the pair
//! search close to linear in the number of chaining pairs while emitting
//! them in the same order as a full permutation scan.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::PuzzleError;
use super::model::{Side, Solution};

/// Upper bound on distinct letters across all sides.
pub const MAX_LETTERS: usize = 128;

/// The three classified solution sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solutions {
    /// Every one-word solution followed by every two-word solution.
    pub all_solutions: Vec<Solution>,
    /// Words that use every letter of the box on their own.
    pub one_word_solutions: Vec<Solution>,
    /// Solutions that use every letter exactly once.
    pub perfect_solutions: Vec<Solution>,
}

/// Bit positions of the letter universe.
struct Universe {
    bits: HashMap<char, u32>,
    full: u128,
    size: usize,
}

impl Universe {
    fn from_sides(sides: &[Side]) -> Result<Self, PuzzleError> {
        let mut bits = HashMap::new();
        for letter in sides.iter().flat_map(Side::letters) {
            let next = bits.len() as u32;
            bits.entry(letter).or_insert(next);
        }

        let size = bits.len();
        if size > MAX_LETTERS {
            return Err(PuzzleError::Solver(format!(
                "puzzle has {} distinct letters, at most {} are supported",
                size, MAX_LETTERS
            )));
        }

        let full = if size == MAX_LETTERS {
            u128::MAX
        } else {
            (1u128 << size) - 1
        };

        Ok(Self { bits, full, size })
    }

    fn bit(&self, letter: char) -> Option<u128> {
        self.bits.get(&letter).map(|&b| 1u128 << b)
    }
}

/// Everything the pair search needs to know about one word.
struct WordProfile<'a> {
    word: &'a str,
    first: Option<char>,
    last: Option<char>,
    /// Universe letters present in the word.
    mask: u128,
    /// The word contains a letter outside the universe.
    foreign: bool,
    /// No letter occurs twice in the word.
    distinct: bool,
    /// Universe letters present in the word minus its first character.
    tail_mask: u128,
    /// No letter occurs twice in the word minus its first character.
    tail_distinct: bool,
}

impl<'a> WordProfile<'a> {
    fn new(word: &'a str, universe: &Universe) -> Self {
        let mut profile = WordProfile {
            word,
            first: word.chars().next(),
            last: word.chars().next_back(),
            mask: 0,
            foreign: false,
            distinct: true,
            tail_mask: 0,
            tail_distinct: true,
        };

        for (position, letter) in word.chars().enumerate() {
            let Some(bit) = universe.bit(letter) else {
                profile.foreign = true;
                continue;
            };
            if profile.mask & bit != 0 {
                profile.distinct = false;
            }
            profile.mask |= bit;

            if position > 0 {
                if profile.tail_mask & bit != 0 {
                    profile.tail_distinct = false;
                }
                profile.tail_mask |= bit;
            }
        }

        profile
    }

    /// Every universe letter occurs in the word. Foreign letters are allowed.
    fn covers(&self, universe: &Universe) -> bool {
        self.mask == universe.full
    }
}

/// Runs both passes over `dictionary` for the box described by `sides`.
///
/// The dictionary is read, never modified; one-word hits are partitioned out
/// before the two-word pass.
///
/// # Errors
/// [`PuzzleError::Solver`] if the sides span more than [`MAX_LETTERS`] distinct letters.
pub fn solve(sides: &[Side], dictionary: &[String]) -> Result<Solutions, PuzzleError> {
    let universe = Universe::from_sides(sides)?;
    let mut solutions = Solutions::default();

    // One-word pass: partition the dictionary into hits and remainder.
    let mut remainder: Vec<WordProfile<'_>> = Vec::with_capacity(dictionary.len());
    for word in dictionary {
        let profile = WordProfile::new(word, &universe);
        if profile.covers(&universe) {
            info!("ALERT: {} is a one word solution", word);
            solutions.one_word_solutions.push(vec![word.clone()]);
            solutions.all_solutions.push(vec![word.clone()]);
            if word.chars().count() == universe.size {
                solutions.perfect_solutions.push(vec![word.clone()]);
            }
        } else {
            remainder.push(profile);
        }
    }

    // Words that can follow a given link letter, in dictionary order.
    let mut by_first: HashMap<char, Vec<usize>> = HashMap::new();
    for (index, profile) in remainder.iter().enumerate() {
        if profile.foreign {
            continue;
        }
        if let Some(first) = profile.first {
            by_first.entry(first).or_default().push(index);
        }
    }

    // Two-word pass over ordered pairs of distinct positions.
    for (i, a) in remainder.iter().enumerate() {
        if a.foreign {
            continue;
        }
        let Some(link) = a.last else { continue };
        let Some(candidates) = by_first.get(&link) else {
            continue;
        };

        for &j in candidates {
            if i == j {
                continue;
            }
            let b = &remainder[j];
            if a.mask | b.mask != universe.full {
                continue;
            }

            let pair = vec![a.word.to_string(), b.word.to_string()];
            if a.distinct && b.tail_distinct && a.mask & b.tail_mask == 0 {
                solutions.perfect_solutions.push(pair.clone());
            }
            solutions.all_solutions.push(pair);
        }
    }

    debug!(
        letters = universe.size,
        words = dictionary.len(),
        all = solutions.all_solutions.len(),
        one_word = solutions.one_word_solutions.len(),
        perfect = solutions.perfect_solutions.len(),
        "Dictionary solved"
    );

    Ok(solutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sides(groups: &[&str]) -> Vec<Side> {
        groups.iter().map(|g| Side::from(*g)).collect()
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn pair(a: &str, b: &str) -> Solution {
        vec![a.to_string(), b.to_string()]
    }

    fn letter_set(sides: &[Side]) -> HashSet<char> {
        sides.iter().flat_map(Side::letters).collect()
    }

    fn is_subsequence(needle: &[Solution], haystack: &[Solution]) -> bool {
        let mut rest = haystack.iter();
        needle.iter().all(|n| rest.any(|h| h == n))
    }

    #[test]
    fn face_earl_chains_and_covers() {
        let s = sides(&["fac", "erl"]);
        let result = solve(&s, &words(&["face", "earl"])).unwrap();

        assert_eq!(result.all_solutions, vec![pair("face", "earl")]);
        assert!(result.one_word_solutions.is_empty());
        // "face" + "arl" repeats the "a".
        assert!(result.perfect_solutions.is_empty());
    }

    #[test]
    fn fact_trim_is_a_perfect_pair() {
        let s = sides(&["fac", "tri", "m"]);
        let result = solve(&s, &words(&["fact", "trim"])).unwrap();
        assert_eq!(result.all_solutions, vec![pair("fact", "trim")]);
        assert_eq!(result.perfect_solutions, vec![pair("fact", "trim")]);
    }

    #[test]
    fn foreign_letters_exclude_a_pair() {
        let s = sides(&["fac", "erl"]);
        let result = solve(&s, &words(&["face", "elbow"])).unwrap();
        assert!(result.all_solutions.is_empty());
        assert!(result.perfect_solutions.is_empty());
    }

    #[test]
    fn chaining_is_directional() {
        // "earl" ends in "l" and nothing starts with "l", so only (face, earl) chains.
        let s = sides(&["fac", "erl"]);
        let result = solve(&s, &words(&["earl", "face"])).unwrap();
        assert_eq!(result.all_solutions, vec![pair("face", "earl")]);
    }

    #[test]
    fn pair_missing_a_letter_is_rejected() {
        let s = sides(&["fac", "erl"]);
        let result = solve(&s, &words(&["face", "ear"])).unwrap();
        assert!(result.all_solutions.is_empty());
    }

    #[test]
    fn repeated_letters_are_valid_but_not_perfect() {
        // (facade, earl) covers {f,a,c,d,e,r,l} but repeats "a".
        let s = sides(&["fac", "erl", "d"]);
        let result = solve(&s, &words(&["facade", "earl"])).unwrap();
        assert_eq!(result.all_solutions, vec![pair("facade", "earl")]);
        assert!(result.perfect_solutions.is_empty());
    }

    #[test]
    fn link_letter_counts_once() {
        // "ab" + "bc" -> "abc": the shared "b" is not a repeat.
        let s = sides(&["ab", "c"]);
        let result = solve(&s, &words(&["ab", "bc"])).unwrap();
        assert_eq!(result.perfect_solutions, vec![pair("ab", "bc")]);
    }

    #[test]
    fn second_word_repeating_its_link_letter_is_not_perfect() {
        // "ab" + "bcb" -> "abcb": "b" appears twice.
        let s = sides(&["ab", "c"]);
        let result = solve(&s, &words(&["ab", "bcb"])).unwrap();
        assert_eq!(result.all_solutions, vec![pair("ab", "bcb")]);
        assert!(result.perfect_solutions.is_empty());
    }

    #[test]
    fn twelve_letter_word_is_one_word_and_perfect() {
        let s = sides(&["abc", "def", "ghi", "jkl"]);
        let dictionary = words(&["abcdefghijkl", "lab", "bcd"]);
        let result = solve(&s, &dictionary).unwrap();

        let hit = vec!["abcdefghijkl".to_string()];
        assert_eq!(result.one_word_solutions, vec![hit.clone()]);
        assert_eq!(result.perfect_solutions.first(), Some(&hit));
        assert_eq!(result.all_solutions.first(), Some(&hit));
        // Removed before the two-word pass: never appears in a pair.
        assert!(result
            .all_solutions
            .iter()
            .filter(|s| s.len() == 2)
            .all(|s| !s.contains(&hit[0])));
    }

    #[test]
    fn long_one_word_solution_is_not_perfect() {
        let s = sides(&["ab", "c"]);
        let result = solve(&s, &words(&["abca"])).unwrap();
        assert_eq!(result.one_word_solutions, vec![vec!["abca".to_string()]]);
        assert!(result.perfect_solutions.is_empty());
    }

    #[test]
    fn one_word_hits_are_excluded_from_pairs() {
        // "abc" alone covers {a,b,c}; without the partition it would also pair with "cab".
        let s = sides(&["ab", "c"]);
        let result = solve(&s, &words(&["abc", "cab", "ba"])).unwrap();
        assert_eq!(
            result.one_word_solutions,
            vec![vec!["abc".to_string()], vec!["cab".to_string()]]
        );
        assert!(result.all_solutions.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn dictionary_is_left_untouched() {
        let s = sides(&["ab", "c"]);
        let dictionary = words(&["abc", "ab", "bc"]);
        let before = dictionary.clone();
        solve(&s, &dictionary).unwrap();
        assert_eq!(dictionary, before);
    }

    #[test]
    fn empty_words_are_ignored() {
        let s = sides(&["ab", "c"]);
        let result = solve(&s, &words(&["", "ab", "bc"])).unwrap();
        assert_eq!(result.all_solutions, vec![pair("ab", "bc")]);
    }

    #[test]
    fn too_many_letters_is_a_solver_fault() {
        let letters: String = (0..200u32).filter_map(|c| char::from_u32(0x4e00 + c)).collect();
        let err = solve(&[Side::new(letters)], &[]).unwrap_err();
        assert_eq!(err.kind(), "SolverFault");
    }

    #[test]
    fn solving_twice_gives_identical_results() {
        let s = sides(&["abc", "def", "ghi", "jkl"]);
        let dictionary = words(&[
            "abdfil", "label", "leaf", "fable", "ledge", "jackal", "lighted", "ekhi", "ikjcgh",
            "bead", "dijkl", "ghijk", "kabcdefl",
        ]);
        assert_eq!(solve(&s, &dictionary).unwrap(), solve(&s, &dictionary).unwrap());
    }

    #[test]
    fn solution_invariants_hold() {
        let s = sides(&["abc", "def", "ghi", "jkl"]);
        let dictionary = words(&[
            "abcdefghijkl",
            "abcdef",
            "fghijkl",
            "fghijkla",
            "abcdefg",
            "gahijkl",
            "ladebcf",
            "fghijk",
            "kjihgfl",
            "lkjihg",
            "gfedcba",
            "bad",
            "dig",
            "zebra",
        ]);
        let universe = letter_set(&s);
        let result = solve(&s, &dictionary).unwrap();
        assert!(!result.all_solutions.is_empty());

        for solution in &result.all_solutions {
            let used: HashSet<char> = solution.iter().flat_map(|w| w.chars()).collect();
            if solution.len() == 2 {
                assert_eq!(solution[0].chars().last(), solution[1].chars().next());
                assert_eq!(used, universe, "coverage failed for {:?}", solution);
            } else {
                assert!(universe.is_subset(&used));
            }
        }

        for solution in &result.perfect_solutions {
            let joined: String = match solution.as_slice() {
                [one] => one.clone(),
                [a, b] => format!("{}{}", a, &b[b.chars().next().map_or(0, char::len_utf8)..]),
                _ => unreachable!("solutions have one or two words"),
            };
            let distinct: HashSet<char> = joined.chars().collect();
            assert_eq!(distinct.len(), joined.chars().count(), "{:?} repeats", solution);
        }

        assert!(is_subsequence(&result.one_word_solutions, &result.all_solutions));
        assert!(is_subsequence(&result.perfect_solutions, &result.all_solutions));
    }

    #[test]
    fn pairs_follow_permutation_order() {
        let s = sides(&["abc", "def"]);
        let dictionary = words(&["abcd", "dfe", "dfeb", "bead", "def"]);
        let result = solve(&s, &dictionary).unwrap();

        // Brute-force reference scan over ordered pairs of distinct positions.
        let universe = letter_set(&s);
        let mut expected = Vec::new();
        for (i, a) in dictionary.iter().enumerate() {
            for (j, b) in dictionary.iter().enumerate() {
                if i == j || a.chars().last() != b.chars().next() {
                    continue;
                }
                let used: HashSet<char> = a.chars().chain(b.chars()).collect();
                if used == universe {
                    expected.push(pair(a, b));
                }
            }
        }
        assert_eq!(result.all_solutions, expected);
    }
}
