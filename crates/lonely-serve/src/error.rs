//! API error types and response formatting.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// API error type that converts to appropriate HTTP responses.
///
/// Every variant is a server-side failure; malformed query parameters fall
/// back to defaults instead of producing an error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Post store error.
    #[error("store error: {0}")]
    Store(#[from] lonely_core::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (error, message) = match &self {
            Self::Store(err) => {
                tracing::error!(error = %err, "store error");
                ("store_error", "A store error occurred")
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                ("internal_error", "An internal error occurred")
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
