//! Integration tests for routing, decode policy and store failures

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use insta_server::codec::DecodePolicy;
use serde_json::json;

use common::{Failure, FailingStore, TestApp};

#[tokio::test]
async fn test_unsupported_methods_are_405() {
    let app = TestApp::new();

    let cases = [
        (Method::DELETE, "/users/"),
        (Method::PUT, "/users/"),
        (Method::DELETE, "/users/a/b"),
        (Method::PATCH, "/users/61680c9492897f0ebd1fbffa"),
        (Method::DELETE, "/posts/"),
        (Method::PATCH, "/posts/"),
        (Method::DELETE, "/posts/61680c9492897f0ebd1fbffa"),
        (Method::PUT, "/posts/a/b"),
        (Method::POST, "/posts/users/"),
        (Method::POST, "/posts/users/61680c9492897f0ebd1fbffa"),
        (Method::DELETE, "/posts/users/61680c9492897f0ebd1fbffa"),
    ];

    for (method, uri) in cases {
        let (status, body) = app.send(method.clone(), uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        assert_eq!(body, b"Method not allowed\n", "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_post_to_owner_listing_is_405_before_body_is_read() {
    let app = TestApp::with_policy(DecodePolicy::Strict);

    let (status, body) = app
        .send(Method::POST, "/posts/users/someone", Some("{broken"))
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, b"Method not allowed\n");
}

#[tokio::test]
async fn test_posts_by_owner_route_wins_over_post_id() {
    let app = TestApp::new();

    let (status, body) = app.get("/posts/users/61680c9492897f0ebd1fbffa").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
}

#[tokio::test]
async fn test_bare_prefixes_reach_their_resource() {
    let app = TestApp::new();

    let (status, body) = app.get("/users/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "no documents in result"}));

    let (status, body) = app.get("/posts/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "no documents in result"}));

    let (status, body) = app.get("/posts/users/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_deeper_paths_stay_under_their_prefix() {
    let app = TestApp::new();

    let (status, body) = app.get("/users/a/b").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "no documents in result"}));

    app.post("/posts/", r#"{"Caption":"nested","UserID":"team/alice"}"#).await;
    let (status, body) = app.get("/posts/users/team/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["Caption"], "nested");
}

#[tokio::test]
async fn test_post_below_prefix_creates() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/users/61680c9492897f0ebd1fbffa", r#"{"Name":"anywhere"}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": "User Added successful"}));

    let (status, body) = app
        .post("/posts/61680c9492897f0ebd1fbffa", r#"{"Caption":"c","UserID":"u-1"}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": "Post Upload successful"}));

    let (_, listed) = app.get("/posts/users/u-1").await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_unknown_paths_are_404() {
    let app = TestApp::new();

    for uri in ["/", "/comments/", "/userss/1", "/health/extra"] {
        let (status, _) = app.send(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn test_strict_policy_rejects_malformed_body() {
    let app = TestApp::with_policy(DecodePolicy::Strict);

    let (status, body) = app.post("/users/", "{broken").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|m| m.starts_with("Malformed JSON body")));

    let (status, body) = app.post("/posts/", r#"{"Caption": 7}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("Caption")));
}

#[tokio::test]
async fn test_strict_policy_accepts_valid_body() {
    let app = TestApp::with_policy(DecodePolicy::Strict);

    let (status, body) = app.post("/posts/", r#"{"caption": "ok"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": "Post Upload successful"}));
}

#[tokio::test]
async fn test_lenient_policy_keeps_well_typed_fields() {
    let app = TestApp::new();

    let (status, _) = app
        .post("/posts/", r#"{"Caption": 7, "UserID": "owner-1"}"#)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/posts/users/owner-1").await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert!(body[0].get("Caption").is_none());
}

#[tokio::test]
async fn test_store_failures_are_generic_500s() {
    let app = TestApp::with_store(Arc::new(FailingStore(Failure::Unavailable)), DecodePolicy::Lenient);

    let (status, body) = app.post("/users/", r#"{"Name":"n"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "A store error occurred"}));

    let (status, body) = app.post("/posts/", r#"{"Caption":"c"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "A store error occurred"}));

    let (status, _) = app.get("/users/61680c9492897f0ebd1fbffa").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = app.get("/posts/users/someone").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_list_query_failure_is_404_with_message() {
    let app = TestApp::with_store(Arc::new(FailingStore(Failure::Query)), DecodePolicy::Lenient);

    let (status, body) = app.get("/posts/users/someone").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "query failed: unknown operator: $eq"}));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "store": "connected"}));

    let app = TestApp::with_store(Arc::new(FailingStore(Failure::Unavailable)), DecodePolicy::Lenient);
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"message": "Store unavailable"}));
}
