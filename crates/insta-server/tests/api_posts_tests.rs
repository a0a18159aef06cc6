//! Integration tests for the posts API

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use insta_server::models::post::parse_timestamp;
use insta_server::{models::Post, store::Filter};
use serde_json::{json, Value};

use common::TestApp;

const OWNER: &str = "61680c9492897f0ebd1fbffa";

async fn create_post(app: &TestApp, caption: &str, owner: &str) {
    let body = json!({
        "Caption": caption,
        "ImageURL": format!("images/{}.jpg", caption),
        "UserID": owner,
    });
    let (status, reply) = app.post("/posts/", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, json!({"success": "Post Upload successful"}));
}

#[tokio::test]
async fn test_create_post_sets_timestamp() {
    let app = TestApp::new();

    let before = Utc::now();
    create_post(&app, "TestPost", OWNER).await;
    let after = Utc::now();

    let posts = app
        .gateway
        .find_all::<Post>(Filter::eq("userid", OWNER))
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);

    let created_at = parse_timestamp(&posts[0].timestamp).unwrap();
    assert!(before <= created_at && created_at <= after);
}

#[tokio::test]
async fn test_get_post_by_id() {
    let app = TestApp::new();
    create_post(&app, "TestPost", OWNER).await;

    let (_, listed) = app.get(&format!("/posts/users/{}", OWNER)).await;
    let id = listed[0]["_id"].as_str().unwrap().to_string();

    let (status, post) = app.get(&format!("/posts/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["_id"], id.as_str());
    assert_eq!(post["Caption"], "TestPost");
    assert_eq!(post["ImageURL"], "images/TestPost.jpg");
    assert_eq!(post["userid"], OWNER);
    assert!(post["timestamp"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_get_unknown_post_is_404() {
    let app = TestApp::new();

    let (status, body) = app.get("/posts/61682afe8d7c88a454bf269a").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "no documents in result"}));
}

#[tokio::test]
async fn test_list_returns_all_and_only_owner_posts() {
    let app = TestApp::new();
    create_post(&app, "one", OWNER).await;
    create_post(&app, "elsewhere", "61680c9492897f0ebd1fbffb").await;
    create_post(&app, "two", OWNER).await;

    let (status, body) = app.get(&format!("/posts/users/{}", OWNER)).await;
    assert_eq!(status, StatusCode::OK);

    let posts = body.as_array().unwrap();
    let captions: Vec<&str> = posts.iter().filter_map(|p| p["Caption"].as_str()).collect();
    assert_eq!(captions, ["one", "two"]);
    assert!(posts.iter().all(|p| p["userid"] == OWNER));
}

#[tokio::test]
async fn test_list_without_posts_is_empty_array() {
    let app = TestApp::new();

    let (status, body) = app.get("/posts/users/nobody").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_owner_id_is_matched_verbatim() {
    let app = TestApp::new();
    create_post(&app, "upper", "ABC").await;

    let (_, body) = app.get("/posts/users/abc").await;
    assert_eq!(body, json!([]));

    let (_, body) = app.get("/posts/users/ABC").await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_listed_posts_are_sparse() {
    let app = TestApp::new();
    let (status, _) = app
        .post("/posts/", &json!({ "UserID": OWNER }).to_string())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get(&format!("/posts/users/{}", OWNER)).await;
    let post = body[0].as_object().unwrap();

    assert!(post.get("Caption").is_none());
    assert!(post.get("ImageURL").is_none());
    assert!(matches!(post.get("timestamp"), Some(Value::String(_))));
}
