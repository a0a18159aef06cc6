//! Request extraction for records and resource paths

use std::convert::Infallible;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRef, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};

use crate::codec::{self, DecodePolicy, Record};
use crate::error::AppError;

/// Record decoded from the request body under the configured [`DecodePolicy`]
///
/// Unlike `axum::Json` this ignores `Content-Type` and, under the lenient
/// policy, never rejects the request.
#[derive(Debug, Clone, Default)]
pub struct RecordBody<R>(pub R);

#[async_trait]
impl<S, R> FromRequest<S> for RecordBody<R>
where
    R: Record,
    S: Send + Sync,
    DecodePolicy: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let policy = DecodePolicy::from_ref(state);

        let body = match Bytes::from_request(req, state).await {
            Ok(body) => body,
            Err(rejection) if policy == DecodePolicy::Lenient => {
                tracing::debug!(error = %rejection.body_text(), "Unreadable request body, using empty record");
                Bytes::new()
            },
            Err(rejection) => return Err(AppError::BadRequest(rejection.body_text())),
        };

        Ok(Self(codec::decode(&body, policy)?))
    }
}

/// Remainder of the path below a resource prefix
///
/// Resource routes are registered as `/<prefix>/` and `/<prefix>/*rest`; this
/// yields `rest` for the latter and an empty string for the bare prefix.
/// Nothing is parsed here, so a malformed tail reaches the handler as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTail(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for PathTail
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tail = match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(tail)) => tail,
            Err(rejection) => {
                tracing::trace!(error = %rejection.body_text(), "No path tail, using empty id");
                String::new()
            },
        };

        Ok(Self(tail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn tail_of(uri: &str) -> String {
        async fn echo(PathTail(tail): PathTail) -> String {
            tail
        }

        let app = Router::new()
            .route("/things/", get(echo))
            .route("/things/*rest", get(echo));
        let request = axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_path_tail() {
        assert_eq!(tail_of("/things/").await, "");
        assert_eq!(tail_of("/things/abc").await, "abc");
        assert_eq!(tail_of("/things/a/b/").await, "a/b/");
        assert_eq!(tail_of("/things/a%20b").await, "a b");
    }
}
