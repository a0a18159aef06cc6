pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{CreateUserCommand, CreateUserError, CreateUserResponse};
pub use queries::{GetUserError, GetUserQuery};
pub use routes::users_routes;
