//! Insta Server Library
//!
//! REST facade over a document store for users and their posts.
//!
//! # Overview
//!
//! - **Users**: `GET /users/{id}`, `POST /users/`
//! - **Posts**: `GET /posts/{id}`, `POST /posts/`
//! - **Posts by owner**: `GET /posts/users/{id}`
//! - **Health**: `GET /health`
//!
//! # Architecture
//!
//! Requests flow through four layers:
//!
//! - **Router** ([`api`], [`features`]): maps method and path to an operation;
//!   unsupported methods on a known route answer `405 Method not allowed`.
//! - **Handlers** ([`features`]): one command or query per operation
//!   (create/get user, create/get post, list posts by owner) holding the
//!   business rules such as password digests and post timestamps.
//! - **Record codec** ([`codec`], [`models`]): wire JSON to typed records and
//!   back, with sparse encoding and a configurable decode policy.
//! - **Store gateway** ([`store`]): get-by-id, filtered find and insert against
//!   a [`DocumentStore`](store::DocumentStore) backend, each bounded by a
//!   timeout.
//!
//! # Example
//!
//! ```no_run
//! use insta_server::{api, config::Config, store};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let gateway = store::connect(&config.store).await?;
//!     api::serve(config, gateway).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use error::{AppError, AppResult};
