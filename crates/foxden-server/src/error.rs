//! Unified server error type.
//!
//! Handlers return `Result<T, ServerError>`. Client errors carry their
//! message through; internal errors are logged in full and answered with
//! a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use foxden_core::publisher::PublishError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Rejected write: bad credential or malformed payload.
    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("not found")]
    NotFound,

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::Publish(e @ PublishError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, e.to_string())
            }
            ServerError::Publish(e @ PublishError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ServerError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_owned())
            }
            ServerError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
