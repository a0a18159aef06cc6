//! Get user query

use insta_common::ObjectId;
use thiserror::Error;

use crate::models::User;
use crate::store::{StoreError, StoreGateway};

/// Query to fetch one user by id
#[derive(Debug, Clone)]
pub struct GetUserQuery {
    pub id: ObjectId,
}

impl GetUserQuery {
    /// Build from a raw path segment; malformed ids become the zero id
    pub fn from_path(segment: &str) -> Self {
        Self {
            id: ObjectId::parse_lenient(segment),
        }
    }
}

#[derive(Debug, Error)]
pub enum GetUserError {
    #[error("{0}")]
    NotFound(StoreError),

    #[error("Failed to load user: {0}")]
    Store(StoreError),
}

impl From<StoreError> for GetUserError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            GetUserError::NotFound(err)
        } else {
            GetUserError::Store(err)
        }
    }
}

#[tracing::instrument(skip(gateway), fields(id = %query.id))]
pub async fn handle(gateway: &StoreGateway, query: GetUserQuery) -> Result<User, GetUserError> {
    let user = gateway.get_by_id::<User>(&query.id).await?;
    tracing::debug!("User retrieved");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreTimeouts};
    use std::sync::Arc;

    #[test]
    fn test_from_path_is_lenient() {
        assert!(GetUserQuery::from_path("xyz").id.is_zero());
        assert_eq!(
            GetUserQuery::from_path("61680c9492897f0ebd1fbffa").id.to_hex(),
            "61680c9492897f0ebd1fbffa"
        );
    }

    #[tokio::test]
    async fn test_handle_missing_user() {
        let gateway = StoreGateway::new(Arc::new(MemoryStore::new()), StoreTimeouts::default());
        let err = handle(&gateway, GetUserQuery::from_path("61680c9492897f0ebd1fbffa"))
            .await
            .unwrap_err();

        assert!(matches!(err, GetUserError::NotFound(_)));
        assert_eq!(err.to_string(), "no documents in result");
    }
}
