//! List posts by owner query
//!
//! Returns every post whose `userid` equals the owner id exactly as it
//! appeared in the path, in store order. No match is an empty list, not an
//! error.

use thiserror::Error;

use crate::models::Post;
use crate::store::{Filter, StoreError, StoreGateway};

#[derive(Debug, Clone)]
pub struct ListPostsByOwnerQuery {
    /// Owner id, unparsed
    pub owner_id: String,
}

#[derive(Debug, Error)]
pub enum ListPostsByOwnerError {
    /// The find or the drain of its cursor failed
    #[error("{0}")]
    Query(StoreError),

    /// The store could not be reached in time
    #[error("Store unavailable: {0}")]
    Unavailable(StoreError),
}

impl From<StoreError> for ListPostsByOwnerError {
    fn from(err: StoreError) -> Self {
        if err.is_unavailable() {
            ListPostsByOwnerError::Unavailable(err)
        } else {
            ListPostsByOwnerError::Query(err)
        }
    }
}

#[tracing::instrument(skip(gateway), fields(owner_id = %query.owner_id))]
pub async fn handle(
    gateway: &StoreGateway,
    query: ListPostsByOwnerQuery,
) -> Result<Vec<Post>, ListPostsByOwnerError> {
    let filter = Filter::eq(Post::OWNER_FIELD, query.owner_id);
    let posts = gateway.find_all::<Post>(filter).await?;

    tracing::debug!(count = posts.len(), "Posts listed");

    Ok(posts)
}
