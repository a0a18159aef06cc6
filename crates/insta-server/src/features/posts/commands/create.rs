//! Create post command
//!
//! The server clock sets `timestamp`, overriding anything the client sent.
//! The owner id is stored as given and not checked against the users
//! collection.

use chrono::Utc;
use insta_common::ObjectId;
use serde::Serialize;
use thiserror::Error;

use crate::models::Post;
use crate::store::{StoreError, StoreGateway};

/// Reply text of a successful create
pub const POST_CREATED: &str = "Post Upload successful";

/// Command to create a new post
#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub post: Post,
}

/// Response from creating a post
#[derive(Debug, Clone, Serialize)]
pub struct CreatePostResponse {
    pub id: ObjectId,
    pub timestamp: String,
}

#[derive(Debug, Error)]
pub enum CreatePostError {
    #[error("Failed to store post: {0}")]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(gateway, command), fields(user_id = %command.post.user_id))]
pub async fn handle(
    gateway: &StoreGateway,
    command: CreatePostCommand,
) -> Result<CreatePostResponse, CreatePostError> {
    let mut post = command.post;
    post.stamp(Utc::now());

    let id = gateway.insert(&post).await?;

    tracing::info!(post_id = %id, "Post created successfully");

    Ok(CreatePostResponse {
        id,
        timestamp: post.timestamp,
    })
}
