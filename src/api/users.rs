use axum::{
    Extension, Json,
    extract::{OriginalUri, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{JsonBody, PathParams, QueryParams};
use super::validation::{non_blank, page_request, paginate};
use super::{ApiError, AppState, Caller, Paginated, SearchQuery};
use crate::services::{UserError, UserInfo, UserInput};

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(errors) => Self::FieldErrors(errors),
            UserError::NotFound => Self::not_found("User"),
            UserError::Denied(denied) => denied.into(),
            UserError::Conflict(msg) => Self::Conflict(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

/// GET /users/
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    OriginalUri(uri): OriginalUri,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Paginated<UserInfo>>, ApiError> {
    let pagination = state.config().read().await.pagination.clone();
    let request = page_request(query.page, query.page_size, &pagination)?;
    let search = non_blank(query.search);

    let page = state
        .user_service()
        .list_users(caller.actor(), search.as_deref(), request)
        .await?;

    Ok(Json(paginate(page, request, &uri)?))
}

/// POST /users/
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<UserInput>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    let user = state
        .user_service()
        .create_user(caller.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/{username}/
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(username): PathParams<String>,
) -> Result<Json<UserInfo>, ApiError> {
    let user = state
        .user_service()
        .get_user(caller.actor(), &username)
        .await?;
    Ok(Json(user))
}

/// PATCH /users/{username}/
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(username): PathParams<String>,
    JsonBody(input): JsonBody<UserInput>,
) -> Result<Json<UserInfo>, ApiError> {
    let user = state
        .user_service()
        .update_user(caller.actor(), &username, input)
        .await?;
    Ok(Json(user))
}

/// DELETE /users/{username}/
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(username): PathParams<String>,
) -> Result<StatusCode, ApiError> {
    state
        .user_service()
        .delete_user(caller.actor(), &username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me/
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<UserInfo>, ApiError> {
    let user = state.user_service().me(caller.actor()).await?;
    Ok(Json(user))
}

/// PATCH /users/me/
///
/// `role` in the body is ignored.
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<UserInput>,
) -> Result<Json<UserInfo>, ApiError> {
    let user = state
        .user_service()
        .update_me(caller.actor(), input)
        .await?;
    Ok(Json(user))
}
