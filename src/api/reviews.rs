use axum::{
    Extension, Json,
    extract::{OriginalUri, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{JsonBody, PathParams, QueryParams};
use super::validation::{page_request, paginate};
use super::{ApiError, AppState, Caller, PageQuery, Paginated};
use crate::domain::{ReviewId, TitleId};
use crate::services::{ReviewError, ReviewInfo, ReviewInput};

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Validation(errors) => Self::FieldErrors(errors),
            ReviewError::NotFound(resource) => Self::not_found(&resource),
            ReviewError::Denied(denied) => denied.into(),
            ReviewError::Conflict(msg) => Self::Conflict(msg),
            ReviewError::Database(msg) => Self::DatabaseError(msg),
            ReviewError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

/// GET /titles/{title_id}/reviews/
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    OriginalUri(uri): OriginalUri,
    PathParams(title_id): PathParams<i32>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<ReviewInfo>>, ApiError> {
    let pagination = state.config().read().await.pagination.clone();
    let request = page_request(query.page, query.page_size, &pagination)?;

    let page = state
        .review_service()
        .list_reviews(caller.actor(), TitleId::new(title_id), request)
        .await?;

    Ok(Json(paginate(page, request, &uri)?))
}

/// GET /titles/{title_id}/reviews/{review_id}/
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams((title_id, review_id)): PathParams<(i32, i32)>,
) -> Result<Json<ReviewInfo>, ApiError> {
    let review = state
        .review_service()
        .get_review(caller.actor(), TitleId::new(title_id), ReviewId::new(review_id))
        .await?;
    Ok(Json(review))
}

/// POST /titles/{title_id}/reviews/
///
/// One review per author and title.
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(title_id): PathParams<i32>,
    JsonBody(input): JsonBody<ReviewInput>,
) -> Result<(StatusCode, Json<ReviewInfo>), ApiError> {
    let review = state
        .review_service()
        .create_review(caller.actor(), TitleId::new(title_id), input)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// PATCH /titles/{title_id}/reviews/{review_id}/
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams((title_id, review_id)): PathParams<(i32, i32)>,
    JsonBody(input): JsonBody<ReviewInput>,
) -> Result<Json<ReviewInfo>, ApiError> {
    let review = state
        .review_service()
        .update_review(
            caller.actor(),
            TitleId::new(title_id),
            ReviewId::new(review_id),
            input,
        )
        .await?;
    Ok(Json(review))
}

/// DELETE /titles/{title_id}/reviews/{review_id}/
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams((title_id, review_id)): PathParams<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    state
        .review_service()
        .delete_review(caller.actor(), TitleId::new(title_id), ReviewId::new(review_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
