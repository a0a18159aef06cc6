pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{CreatePostCommand, CreatePostError, CreatePostResponse};
pub use queries::{GetPostError, GetPostQuery, ListPostsByOwnerError, ListPostsByOwnerQuery};
pub use routes::posts_routes;
