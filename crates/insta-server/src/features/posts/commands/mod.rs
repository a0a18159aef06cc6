pub mod create;

pub use create::{CreatePostCommand, CreatePostError, CreatePostResponse};
