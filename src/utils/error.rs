//! Error types shared across the hub and its HTTP surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors raised by hub operations.
///
/// `Validation` and `NotFound` are surfaced to HTTP callers; `Transport`
/// failures belong to a single session and are handled internally by
/// removing that session, never by failing a submit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    /// Input rejected before any state was mutated.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced client id is not registered (stale or never existed).
    #[error("client not found: {0}")]
    NotFound(String),

    /// A session's outbound queue is full or its receiver is gone.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Unexpected internal failure, e.g. payload serialization.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = match &self {
            HubError::Validation(_) => StatusCode::BAD_REQUEST,
            HubError::NotFound(_) => StatusCode::NOT_FOUND,
            HubError::Transport(_) | HubError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
