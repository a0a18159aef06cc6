//! Feature slices of the Insta API
//!
//! Each feature is a vertical slice:
//! - `commands/` - write operations (create)
//! - `queries/` - read operations (get, list)
//! - `routes.rs` - HTTP route definitions and error mapping
//!
//! # Features
//!
//! - **users**: create and fetch users
//! - **posts**: create and fetch posts, list a user's posts

pub mod posts;
pub mod users;

use axum::{extract::FromRef, Router};

use crate::codec::DecodePolicy;
use crate::store::StoreGateway;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Shared handle to the document store
    pub gateway: StoreGateway,
    /// How request bodies are decoded
    pub decode_policy: DecodePolicy,
}

impl FeatureState {
    pub fn new(gateway: StoreGateway, decode_policy: DecodePolicy) -> Self {
        Self {
            gateway,
            decode_policy,
        }
    }
}

impl FromRef<FeatureState> for StoreGateway {
    fn from_ref(state: &FeatureState) -> Self {
        state.gateway.clone()
    }
}

impl FromRef<FeatureState> for DecodePolicy {
    fn from_ref(state: &FeatureState) -> Self {
        state.decode_policy
    }
}

/// Router with every feature's routes at their full paths
///
/// Each resource owns a path prefix and dispatches on the method itself, so
/// any method it does not serve anywhere under the prefix is a 405.
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .merge(users::users_routes())
        .merge(posts::posts_routes())
        .with_state(state)
}
