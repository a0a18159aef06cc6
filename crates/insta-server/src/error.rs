//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::MessageResponse;
use crate::codec::DecodeError;

/// Result type alias for cross-cutting handler failures
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Failures not owned by a single feature, rendered as `{"message": ...}`
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => {
                tracing::debug!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, message)
            },
            AppError::Unavailable(ref message) => {
                tracing::error!("Service unavailable: {}", message);
                (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable".to_string())
            },
        };

        (status, Json(MessageResponse::new(message))).into_response()
    }
}
