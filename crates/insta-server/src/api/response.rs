//! API response types

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Body of every error reply: `{"message": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of a successful create: `{"success": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: String,
}

impl SuccessResponse {
    pub fn new(success: impl Into<String>) -> Self {
        Self {
            success: success.into(),
        }
    }
}

/// Plain-text reply for a method a route does not serve
pub const METHOD_NOT_ALLOWED_BODY: &str = "Method not allowed\n";

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        METHOD_NOT_ALLOWED_BODY,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_shape() {
        let json = serde_json::to_string(&MessageResponse::new("no documents in result")).unwrap();
        assert_eq!(json, r#"{"message":"no documents in result"}"#);
    }

    #[test]
    fn test_success_response_shape() {
        let json = serde_json::to_string(&SuccessResponse::new("User Added successful")).unwrap();
        assert_eq!(json, r#"{"success":"User Added successful"}"#);
    }

    #[tokio::test]
    async fn test_method_not_allowed_response() {
        let response = method_not_allowed().await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
