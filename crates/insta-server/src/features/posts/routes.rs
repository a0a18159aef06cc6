//! Post API routes
//!
//! Everything under the `/posts/` prefix belongs to this resource, except the
//! more specific `/posts/users/` prefix which lists a user's posts:
//!
//! - `POST /posts/` - Create a post (any path below the prefix creates too)
//! - `GET /posts/:id` - Get a post by id
//! - `GET /posts/users/:id` - List the posts of one user
//!
//! Any other method under a prefix answers `405 Method not allowed`.

use axum::{
    extract::{FromRequest, Request, State},
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
use crate::models::Post;
use crate::store::StoreGateway;

use super::{
    commands::{create::POST_CREATED, CreatePostCommand, CreatePostError},
    queries::{GetPostError, GetPostQuery, ListPostsByOwnerError, ListPostsByOwnerQuery},
};

/// Prefix below `/posts/` that selects the posts-by-owner listing
const OWNER_PREFIX: &str = "users/";

/// Creates the posts router
pub fn posts_routes() -> Router<FeatureState> {
    let resource: MethodRouter<FeatureState> = get(get_from_posts)
        .post(post_to_posts)
        .fallback(method_not_allowed);

    Router::new()
        .route("/posts/", resource.clone())
        .route("/posts/*rest", resource)
}

/// What the path below `/posts/` addresses
#[derive(Debug, PartialEq, Eq)]
enum PostsTarget<'a> {
    /// A single post, by raw id
    Post(&'a str),
    /// The posts of one owner, by raw owner id
    Owner(&'a str),
}

impl<'a> PostsTarget<'a> {
    fn parse(tail: &'a str) -> Self {
        match tail.strip_prefix(OWNER_PREFIX) {
            Some(owner_id) => PostsTarget::Owner(owner_id),
            None => PostsTarget::Post(tail),
        }
    }
}

async fn get_from_posts(
    State(gateway): State<StoreGateway>,
    PathTail(tail): PathTail,
) -> Result<Response, PostApiError> {
    match PostsTarget::parse(&tail) {
        PostsTarget::Owner(owner_id) => list_posts_by_owner(&gateway, owner_id).await,
        PostsTarget::Post(id) => get_post(&gateway, id).await,
    }
}

/// The listing only answers GET, so the body is not read for it
async fn post_to_posts(
    State(state): State<FeatureState>,
    PathTail(tail): PathTail,
    request: Request,
) -> Response {
    if let PostsTarget::Owner(_) = PostsTarget::parse(&tail) {
        return method_not_allowed().await;
    }

    match RecordBody::<Post>::from_request(request, &state).await {
        Ok(RecordBody(post)) => create_post(&state.gateway, post).await.into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

/// Create a post
///
/// # Request Body
///
/// ```json
/// { "Caption": "TestPost", "ImageURL": "images/test-post.jpg", "UserID": "61680c9492897f0ebd1fbffa" }
/// ```
///
/// # Response
///
/// - `200 OK` - `{"success": "Post Upload successful"}`
/// - `500 Internal Server Error` - Store failure
#[tracing::instrument(skip(gateway, post))]
async fn create_post(gateway: &StoreGateway, post: Post) -> Result<Response, PostApiError> {
    let response = super::commands::create::handle(gateway, CreatePostCommand { post }).await?;

    tracing::info!(
        post_id = %response.id,
        timestamp = %response.timestamp,
        "Post created via API"
    );

    Ok((StatusCode::OK, Json(SuccessResponse::new(POST_CREATED))).into_response())
}

/// Get a post by id
///
/// A missing or malformed id is looked up as the zero id.
///
/// # Response
///
/// - `200 OK` - The stored post
/// - `404 Not Found` - `{"message": "no documents in result"}`
/// - `500 Internal Server Error` - Store failure
#[tracing::instrument(skip(gateway))]
async fn get_post(gateway: &StoreGateway, id: &str) -> Result<Response, PostApiError> {
    let post = super::queries::get::handle(gateway, GetPostQuery::from_path(id)).await?;

    Ok((StatusCode::OK, Json(post)).into_response())
}

/// List the posts of one user
///
/// The owner id is the rest of the path, matched verbatim; an empty one
/// matches posts without an owner.
///
/// # Response
///
/// - `200 OK` - JSON array of posts, `[]` when the user has none
/// - `404 Not Found` - The find failed
/// - `500 Internal Server Error` - Store unreachable or timed out
#[tracing::instrument(skip(gateway))]
async fn list_posts_by_owner(gateway: &StoreGateway, owner_id: &str) -> Result<Response, PostApiError> {
    let query = ListPostsByOwnerQuery {
        owner_id: owner_id.to_string(),
    };
    let posts = super::queries::list_by_owner::handle(gateway, query).await?;

    Ok((StatusCode::OK, Json(posts)).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for post API endpoints
#[derive(Debug)]
enum PostApiError {
    Create(CreatePostError),
    Get(GetPostError),
    List(ListPostsByOwnerError),
}

impl From<CreatePostError> for PostApiError {
    fn from(err: CreatePostError) -> Self {
        Self::Create(err)
    }
}

impl From<GetPostError> for PostApiError {
    fn from(err: GetPostError) -> Self {
        Self::Get(err)
    }
}

impl From<ListPostsByOwnerError> for PostApiError {
    fn from(err: ListPostsByOwnerError) -> Self {
        Self::List(err)
    }
}

impl IntoResponse for PostApiError {
    fn into_response(self) -> Response {
        match self {
            PostApiError::Get(GetPostError::NotFound(ref err))
            | PostApiError::List(ListPostsByOwnerError::Query(ref err)) => {
                tracing::debug!("Post lookup failed: {}", err);
                (StatusCode::NOT_FOUND, Json(MessageResponse::new(err.to_string()))).into_response()
            },
            PostApiError::Get(GetPostError::Store(_))
            | PostApiError::List(ListPostsByOwnerError::Unavailable(_))
            | PostApiError::Create(CreatePostError::Store(_)) => {
                tracing::error!("Store error in post API: {}", self);
                let body = MessageResponse::new("A store error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            },
        }
    }
}

impl std::fmt::Display for PostApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostApiError::Create(e) => write!(f, "{}", e),
            PostApiError::Get(e) => write!(f, "{}", e),
            PostApiError::List(e) => write!(f, "{}", e),
        }
    }
}
