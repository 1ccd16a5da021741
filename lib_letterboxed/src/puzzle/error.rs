use thiserror::Error;

/// Failures of a single refresh attempt.
///
/// The type is `Clone` so one single-flight outcome can be handed to every
/// caller that waited on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// The source was unreachable, answered with an error status, or the page
    /// no longer carries the embedded game data.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// A required key is absent from the fetched payload.
    #[error("Missing required key: {field}")]
    Validation {
        /// The first missing key, in declaration order of the required keys.
        field: String,
    },

    /// Every required key is present but at least one has the wrong shape.
    #[error("Malformed puzzle payload: {0}")]
    Malformed(String),

    /// The matcher could not run on the given sides/dictionary.
    #[error("Solver fault: {0}")]
    Solver(String),
}

impl PuzzleError {
    /// Stable machine-readable name, used in HTTP error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PuzzleError::Fetch(_) => "FetchError",
            PuzzleError::Validation { .. } | PuzzleError::Malformed(_) => "ValidationError",
            PuzzleError::Solver(_) => "SolverFault",
        }
    }
}
