//! # HTTP Routes
//!
//! - `GET /get_letter_boxed_data`: the current snapshot, refreshed inline
//!   when missing or expired. A failed refresh is a `502` with a JSON body.
//! - `GET /health`: liveness plus what the cache holds. Never refreshes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use lib_letterboxed::puzzle::{PuzzleError, PuzzleSnapshot};
use lib_letterboxed::utils::now_unix;

use crate::letterboxed_logic::state::AppState;

/// # Application Error
///
/// Failures surfaced to HTTP clients.
#[derive(Debug)]
pub enum AppError {
    /// The inline refresh failed; no stale data is served in its place.
    Refresh(PuzzleError),
}

impl From<PuzzleError> for AppError {
    fn from(e: PuzzleError) -> Self {
        AppError::Refresh(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_json) = match self {
            AppError::Refresh(e) => {
                error!(kind = e.kind(), "Refresh for request failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "error_type": e.kind(),
                        "message": e.to_string()
                    }),
                )
            }
        };
        (status, Json(error_json)).into_response()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Refresh(e) => write!(f, "Refresh error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Refresh(e) => Some(e),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/get_letter_boxed_data", get(letter_boxed_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

async fn letter_boxed_handler(State(state): State<AppState>) -> Result<Json<Arc<PuzzleSnapshot>>, AppError> {
    let snapshot = state.query.handle_query().await?;
    Ok(Json(snapshot))
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(health_body(state.query.current().as_deref(), now_unix()))
}

fn health_body(snapshot: Option<&PuzzleSnapshot>, ts: i64) -> Value {
    json!({
        "status": "ok",
        "hasSnapshot": snapshot.is_some(),
        "printDate": snapshot.map(|s| s.print_date()),
        "expiration": snapshot.and_then(|s| s.expiration()),
        "ts": ts
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PuzzleSnapshot {
        let raw = serde_json::from_value(json!({
            "ourSolution": ["FACT", "TRIM"],
            "printDate": "2024-01-15",
            "sides": ["FAC", "TRI", "M"],
            "date": "2024-01-15",
            "dictionary": ["FACT", "TRIM"],
            "expiration": 1705381200
        }))
        .unwrap();
        lib_letterboxed::cache::build_snapshot(raw).unwrap()
    }

    #[test]
    fn refresh_failure_is_a_bad_gateway() {
        let response = AppError::from(PuzzleError::Fetch("HTTP 503".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn health_reports_an_empty_cache() {
        let body = health_body(None, 42);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["hasSnapshot"], false);
        assert!(body["printDate"].is_null());
        assert_eq!(body["ts"], 42);
    }

    #[test]
    fn health_reports_the_held_snapshot() {
        let held = snapshot();
        let body = health_body(Some(&held), 42);
        assert_eq!(body["hasSnapshot"], true);
        assert_eq!(body["printDate"], "2024-01-15");
        assert_eq!(body["expiration"], 1705381200);
    }

    #[test]
    fn snapshot_serializes_with_publisher_keys() {
        let body = serde_json::to_value(Arc::new(snapshot())).unwrap();
        assert_eq!(body["printDate"], "2024-01-15");
        assert_eq!(body["sides"], json!(["FAC", "TRI", "M"]));
        assert_eq!(body["perfectSolutions"], json!([["FACT", "TRIM"]]));
    }
}
