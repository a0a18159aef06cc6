//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Main error type for shared utilities
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid object id '{value}': {reason}")]
    InvalidObjectId { value: String, reason: String },
}

impl CommonError {
    /// Create an invalid object id error
    pub fn invalid_object_id(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidObjectId {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
