//! API error types for the Soundbox server
//!
//! The contract the HTTP surface must hold: "operation had no effect because
//! already in the target state" is a success (reported via flags in the
//! response body), while "operation could not be performed" is an error
//! carried by [`ApiError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// External player process could not be started (502)
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::SpawnFailed(msg) => (StatusCode::BAD_GATEWAY, "SPAWN_FAILED", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<soundbox_common::Error> for ApiError {
    fn from(err: soundbox_common::Error) -> Self {
        use soundbox_common::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::SpawnFailed(msg) => ApiError::SpawnFailed(msg),
            Error::Database(e) => ApiError::Internal(format!("Database error: {e}")),
            Error::Io(e) => ApiError::Internal(format!("IO error: {e}")),
            Error::Config(msg) => ApiError::Internal(format!("Configuration error: {msg}")),
            Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
