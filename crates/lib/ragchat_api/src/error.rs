//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ragchat_core::qa::QaError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Upstream(m) => (StatusCode::BAD_GATEWAY, "upstream_error", m.as_str()),
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<QaError> for AppError {
    fn from(e: QaError) -> Self {
        match e {
            QaError::Embedding(e) => AppError::Upstream(format!("embedding: {e}")),
            QaError::Llm(e) => AppError::Upstream(format!("chat model: {e}")),
            QaError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
