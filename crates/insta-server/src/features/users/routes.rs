//! User API routes
//!
//! Everything under the `/users/` prefix belongs to this resource:
//!
//! - `POST /users/` - Create a user (any path below the prefix creates too)
//! - `GET /users/:id` - Get a user by id
//!
//! Any other method under the prefix answers `405 Method not allowed`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};

use crate::api::{
    extract::{PathTail, RecordBody},
    response::{method_not_allowed, MessageResponse, SuccessResponse},
};
use crate::features::FeatureState;
use crate::models::User;
use crate::store::StoreGateway;

use super::{
    commands::{create::USER_CREATED, CreateUserCommand, CreateUserError},
    queries::{GetUserError, GetUserQuery},
};

/// Creates the users router
pub fn users_routes() -> Router<FeatureState> {
    let resource: MethodRouter<FeatureState> = get(get_user)
        .post(create_user)
        .fallback(method_not_allowed);

    Router::new()
        .route("/users/", resource.clone())
        .route("/users/*rest", resource)
}

/// Create a user
///
/// # Request Body
///
/// ```json
/// { "Name": "testUser1", "Email": "testUser1@mail.com", "Password": "testPassword1" }
/// ```
///
/// # Response
///
/// - `200 OK` - `{"success": "User Added successful"}`
/// - `500 Internal Server Error` - Store failure
#[tracing::instrument(skip(gateway, user))]
async fn create_user(
    State(gateway): State<StoreGateway>,
    RecordBody(user): RecordBody<User>,
) -> Result<Response, UserApiError> {
    let response = super::commands::create::handle(&gateway, CreateUserCommand { user }).await?;

    tracing::info!(user_id = %response.id, "User created via API");

    Ok((StatusCode::OK, Json(SuccessResponse::new(USER_CREATED))).into_response())
}

/// Get a user by id
///
/// The id is the whole path below `/users/`. A missing or malformed id is
/// looked up as the zero id and so is not found.
///
/// # Response
///
/// - `200 OK` - The stored user, password digest included
/// - `404 Not Found` - `{"message": "no documents in result"}`
/// - `500 Internal Server Error` - Store failure
#[tracing::instrument(skip(gateway), fields(id = %id))]
async fn get_user(
    State(gateway): State<StoreGateway>,
    PathTail(id): PathTail,
) -> Result<Response, UserApiError> {
    let user = super::queries::get::handle(&gateway, GetUserQuery::from_path(&id)).await?;

    Ok((StatusCode::OK, Json(user)).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for user API endpoints
#[derive(Debug)]
enum UserApiError {
    Create(CreateUserError),
    Get(GetUserError),
}

impl From<CreateUserError> for UserApiError {
    fn from(err: CreateUserError) -> Self {
        Self::Create(err)
    }
}

impl From<GetUserError> for UserApiError {
    fn from(err: GetUserError) -> Self {
        Self::Get(err)
    }
}

impl IntoResponse for UserApiError {
    fn into_response(self) -> Response {
        match self {
            UserApiError::Get(GetUserError::NotFound(ref err)) => {
                (StatusCode::NOT_FOUND, Json(MessageResponse::new(err.to_string()))).into_response()
            },
            UserApiError::Get(GetUserError::Store(_)) | UserApiError::Create(CreateUserError::Store(_)) => {
                tracing::error!("Store error in user API: {}", self);
                let body = MessageResponse::new("A store error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            },
        }
    }
}

impl std::fmt::Display for UserApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserApiError::Create(e) => write!(f, "{}", e),
            UserApiError::Get(e) => write!(f, "{}", e),
        }
    }
}
