//! The HTTP-boundary error type.
//!
//! The core (coordinator, reconstructor, registry) never fails for a
//! data-path condition — malformed envelopes and stale/duplicate events are
//! drops, not errors. `ApiError` exists only for the boundary: a non-JSON
//! body (handled by axum's extractor before a handler even runs) and
//! genuinely unknown-id / empty-result queries, which surface as 404s.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no rocket with id {0}")]
    RocketNotFound(String),

    #[error("no rockets found for mission {0}")]
    MissionNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::RocketNotFound(_) | ApiError::MissionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
