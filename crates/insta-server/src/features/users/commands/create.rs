//! Create user command
//!
//! Stores a new user with its password replaced by
//! `base64(SHA-256(password))`. Email addresses are not checked for
//! uniqueness.

use insta_common::{digest::password_digest, ObjectId};
use serde::Serialize;
use thiserror::Error;

use crate::models::User;
use crate::store::{StoreError, StoreGateway};

/// Reply text of a successful create
pub const USER_CREATED: &str = "User Added successful";

/// Command to create a new user
#[derive(Debug, Clone, Default)]
pub struct CreateUserCommand {
    /// Decoded request body; `password` is still plaintext here
    pub user: User,
}

/// Response from creating a user
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserResponse {
    pub id: ObjectId,
}

#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("Failed to store user: {0}")]
    Store(#[from] StoreError),
}

/// Handles the create user command
#[tracing::instrument(skip(gateway, command))]
pub async fn handle(
    gateway: &StoreGateway,
    command: CreateUserCommand,
) -> Result<CreateUserResponse, CreateUserError> {
    let mut user = command.user;
    user.password = password_digest(&user.password);

    let id = gateway.insert(&user).await?;

    tracing::info!(user_id = %id, "User created successfully");

    Ok(CreateUserResponse { id })
}
