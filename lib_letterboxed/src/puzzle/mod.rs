//! # Puzzle Module
//!
//! Everything that turns the publisher's page into a classified set of
//! solutions.
//!
//! ## Contained Modules:
//!
//! - **`model`**: `RawPuzzle`, `ValidPuzzle`, `Side` and the installed
//!   `PuzzleSnapshot`, all `serde`-mapped to the publisher's camelCase keys.
//! - **`validate`**: structural validation naming the first missing required key.
//! - **`source`**: the `PuzzleSource` seam plus the production implementation
//!   that scrapes the embedded `window.gameData` block from the puzzle page.
//! - **`solver`**: the dictionary matcher producing one-word, two-word and
//!   perfect solutions.
//! - **`error`**: the `PuzzleError` taxonomy shared by the refresh pipeline.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Error taxonomy of the fetch/validate/solve pipeline.
pub mod error;
/// Serde data model for raw, validated and solved puzzles.
pub mod model;
/// Dictionary matcher.
pub mod solver;
/// Puzzle fetch collaborator and page extraction.
pub mod source;
/// Required-field validation.
pub mod validate;

pub use error::PuzzleError;
pub use model::{PuzzleSnapshot, RawPuzzle, Side, Solution, ValidPuzzle};
pub use solver::{solve, Solutions};
pub use source::{extract_game_data, NytPuzzleSource, PuzzleSource, DEFAULT_SOURCE_URL};
pub use validate::{validate, REQUIRED_KEYS};
