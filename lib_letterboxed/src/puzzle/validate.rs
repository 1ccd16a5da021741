//! Structural validation of a fetched payload.

use serde_json::Value;

use super::error::PuzzleError;
use super::model::{RawPuzzle, ValidPuzzle};
use crate::utils::timing::timed;

/// Keys a payload must carry, checked in this order.
pub const REQUIRED_KEYS: [&str; 5] = ["ourSolution", "printDate", "sides", "date", "dictionary"];

/// Checks the required keys and converts the payload into a [`ValidPuzzle`].
///
/// # Errors
/// - [`PuzzleError::Validation`] naming the first missing key of [`REQUIRED_KEYS`].
/// - [`PuzzleError::Malformed`] when every key is present but one has the
///   wrong shape (e.g. `sides` is not a list).
pub fn validate(raw: RawPuzzle) -> Result<ValidPuzzle, PuzzleError> {
    timed("validate_data", || {
        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !raw.contains_key(**key)) {
            return Err(PuzzleError::Validation {
                field: (*missing).to_string(),
            });
        }

        serde_json::from_value::<ValidPuzzle>(Value::Object(raw.0))
            .map_err(|e| PuzzleError::Malformed(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawPuzzle {
        match value {
            Value::Object(map) => RawPuzzle(map),
            _ => unreachable!("test payloads are objects"),
        }
    }

    fn complete() -> Value {
        json!({
            "ourSolution": ["FACE", "EARL"],
            "printDate": "2024-01-15",
            "sides": ["FAC", "ERL"],
            "date": "2024-01-15",
            "dictionary": ["FACE", "EARL"],
            "expiration": 1705381200
        })
    }

    #[test]
    fn accepts_complete_payload() {
        let puzzle = validate(raw(complete())).unwrap();
        assert_eq!(puzzle.print_date, "2024-01-15");
        assert_eq!(puzzle.dictionary.len(), 2);
        assert_eq!(puzzle.expiration, Some(1705381200));
    }

    #[test]
    fn names_the_first_missing_key() {
        let mut payload = complete();
        let map = payload.as_object_mut().unwrap();
        map.remove("sides");
        map.remove("dictionary");

        let err = validate(raw(payload)).unwrap_err();
        assert_eq!(
            err,
            PuzzleError::Validation {
                field: "sides".to_string()
            }
        );
        assert_eq!(err.to_string(), "Missing required key: sides");
    }

    #[test]
    fn missing_expiration_is_not_a_validation_error() {
        let mut payload = complete();
        payload.as_object_mut().unwrap().remove("expiration");
        let puzzle = validate(raw(payload)).unwrap();
        assert_eq!(puzzle.expiration, None);
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let mut payload = complete();
        payload["dictionary"] = json!("FACE EARL");
        let err = validate(raw(payload)).unwrap_err();
        assert!(matches!(err, PuzzleError::Malformed(_)));
        assert_eq!(err.kind(), "ValidationError");
    }
}
