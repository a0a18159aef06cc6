pub mod get;
pub mod list_by_owner;

pub use get::{GetPostError, GetPostQuery};
pub use list_by_owner::{ListPostsByOwnerError, ListPostsByOwnerQuery};
