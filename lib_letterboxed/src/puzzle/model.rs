//! # Puzzle Data Model
//!
//! Strongly-typed mapping of the publisher's `window.gameData` payload.
//!
//! The payload carries more keys than the service needs (`id`, `editor`,
//! `par`, ...). Those are kept in a catch-all map so the served snapshot
//! passes them through unchanged.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// One solution: a single word, or two words chained last-letter to first-letter.
pub type Solution = Vec<String>;

/// # Raw Puzzle
///
/// The untyped JSON object extracted from the puzzle page, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPuzzle(pub Map<String, Value>);

impl RawPuzzle {
    /// Looks up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether a top-level key is present (even if `null`).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

impl From<Map<String, Value>> for RawPuzzle {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// # Side
///
/// One group of letters on the box. The publisher ships each side as a
/// string (`"ABC"`); a list of single letters (`["A","B","C"]`) is accepted
/// too. Sides always serialize back as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Side(String);

impl Side {
    /// Builds a side from its letters.
    pub fn new(letters: impl Into<String>) -> Self {
        Self(letters.into())
    }

    /// The letters of this side, in order.
    pub fn letters(&self) -> std::str::Chars<'_> {
        self.0.chars()
    }

    /// The side as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Side {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SideRepr {
    Joined(String),
    Letters(Vec<String>),
}

impl<'de> Deserialize<'de> for Side {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match SideRepr::deserialize(deserializer)? {
            SideRepr::Joined(s) => Ok(Side(s)),
            SideRepr::Letters(letters) => Ok(Side(letters.concat())),
        }
    }
}

impl Serialize for Side {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// # Valid Puzzle
///
/// A payload that carries every required key with the expected shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidPuzzle {
    /// The publisher's own solution.
    pub our_solution: Vec<String>,
    /// Human-facing puzzle date (e.g. "2024-01-15").
    pub print_date: String,
    /// The letter groups of the box.
    pub sides: Vec<Side>,
    /// Internal puzzle date.
    pub date: String,
    /// Candidate words, in publisher order.
    pub dictionary: Vec<String>,
    /// Unix seconds after which the puzzle is stale. `None` means already stale.
    #[serde(default, deserialize_with = "deserialize_opt_unix_secs")]
    pub expiration: Option<i64>,
    /// Any other keys of the payload, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts integer or floating Unix seconds, or `null`.
fn deserialize_opt_unix_secs<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| de::Error::custom("expiration is not a valid timestamp")),
        Some(other) => Err(de::Error::custom(format!(
            "expiration must be a number, got {}",
            other
        ))),
    }
}

/// # Puzzle Snapshot
///
/// The unit the cache stores and the endpoint serves: the validated puzzle
/// plus the three solution sequences computed at refresh time.
///
/// `one_word_solutions` and `perfect_solutions` are subsequences of
/// `all_solutions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSnapshot {
    /// The validated puzzle, flattened into the top-level object.
    #[serde(flatten)]
    pub puzzle: ValidPuzzle,
    /// Every one- and two-word solution.
    pub all_solutions: Vec<Solution>,
    /// Single words using every letter of the box.
    pub one_word_solutions: Vec<Solution>,
    /// Solutions using every letter exactly once.
    pub perfect_solutions: Vec<Solution>,
}

impl PuzzleSnapshot {
    /// Unix seconds at which this snapshot goes stale.
    pub fn expiration(&self) -> Option<i64> {
        self.puzzle.expiration
    }

    /// The puzzle's print date.
    pub fn print_date(&self) -> &str {
        &self.puzzle.print_date
    }

    /// `true` while `now` is strictly before the expiration.
    pub fn is_fresh(&self, now: i64) -> bool {
        matches!(self.puzzle.expiration, Some(expiration) if now < expiration)
    }
}
