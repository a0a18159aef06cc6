//! Insta Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the Insta API workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all workspace members:
//!
//! - **Error Handling**: Shared error type and result alias
//! - **Digest**: One-way password digests stored in place of secrets
//! - **Logging**: Centralized `tracing` subscriber setup
//! - **Types**: Store identifiers ([`ObjectId`](types::ObjectId))
//!
//! # Example
//!
//! ```no_run
//! use insta_common::digest::password_digest;
//! use insta_common::types::ObjectId;
//!
//! let id = ObjectId::generate();
//! let stored = password_digest("hunter2");
//! assert_ne!(stored, "hunter2");
//! assert_eq!(id.to_hex().len(), 24);
//! ```

pub mod digest;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use types::ObjectId;
