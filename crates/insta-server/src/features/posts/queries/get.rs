//! Get post query

use insta_common::ObjectId;
use thiserror::Error;

use crate::models::Post;
use crate::store::{StoreError, StoreGateway};

/// Query to fetch one post by id
#[derive(Debug, Clone)]
pub struct GetPostQuery {
    pub id: ObjectId,
}

impl GetPostQuery {
    /// Build from a raw path segment; malformed ids become the zero id
    pub fn from_path(segment: &str) -> Self {
        Self {
            id: ObjectId::parse_lenient(segment),
        }
    }
}

#[derive(Debug, Error)]
pub enum GetPostError {
    #[error("{0}")]
    NotFound(StoreError),

    #[error("Failed to load post: {0}")]
    Store(StoreError),
}

impl From<StoreError> for GetPostError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            GetPostError::NotFound(err)
        } else {
            GetPostError::Store(err)
        }
    }
}

#[tracing::instrument(skip(gateway), fields(id = %query.id))]
pub async fn handle(gateway: &StoreGateway, query: GetPostQuery) -> Result<Post, GetPostError> {
    let post = gateway.get_by_id::<Post>(&query.id).await?;
    tracing::debug!("Post retrieved");
    Ok(post)
}
