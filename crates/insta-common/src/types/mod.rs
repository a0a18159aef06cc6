//! Common types used across the workspace

pub mod object_id;

pub use object_id::ObjectId;
