//! Typed records stored by the service

pub mod post;
pub mod user;

pub use post::Post;
pub use user::User;
