use axum::{
    Extension, Json,
    extract::{OriginalUri, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{JsonBody, PathParams, QueryParams};
use super::validation::{page_request, paginate};
use super::{ApiError, AppState, Caller, PageQuery, Paginated};
use crate::domain::{CommentId, ReviewId, TitleId};
use crate::services::{CommentInfo, CommentInput};

/// GET /titles/{title_id}/reviews/{review_id}/comments/
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    OriginalUri(uri): OriginalUri,
    PathParams((title_id, review_id)): PathParams<(i32, i32)>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<CommentInfo>>, ApiError> {
    let pagination = state.config().read().await.pagination.clone();
    let request = page_request(query.page, query.page_size, &pagination)?;

    let page = state
        .review_service()
        .list_comments(
            caller.actor(),
            TitleId::new(title_id),
            ReviewId::new(review_id),
            request,
        )
        .await?;

    Ok(Json(paginate(page, request, &uri)?))
}

/// GET /titles/{title_id}/reviews/{review_id}/comments/{comment_id}/
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams((title_id, review_id, comment_id)): PathParams<(i32, i32, i32)>,
) -> Result<Json<CommentInfo>, ApiError> {
    let comment = state
        .review_service()
        .get_comment(
            caller.actor(),
            TitleId::new(title_id),
            ReviewId::new(review_id),
            CommentId::new(comment_id),
        )
        .await?;
    Ok(Json(comment))
}

/// POST /titles/{title_id}/reviews/{review_id}/comments/
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams((title_id, review_id)): PathParams<(i32, i32)>,
    JsonBody(input): JsonBody<CommentInput>,
) -> Result<(StatusCode, Json<CommentInfo>), ApiError> {
    let comment = state
        .review_service()
        .create_comment(
            caller.actor(),
            TitleId::new(title_id),
            ReviewId::new(review_id),
            input,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /titles/{title_id}/reviews/{review_id}/comments/{comment_id}/
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams((title_id, review_id, comment_id)): PathParams<(i32, i32, i32)>,
    JsonBody(input): JsonBody<CommentInput>,
) -> Result<Json<CommentInfo>, ApiError> {
    let comment = state
        .review_service()
        .update_comment(
            caller.actor(),
            TitleId::new(title_id),
            ReviewId::new(review_id),
            CommentId::new(comment_id),
            input,
        )
        .await?;
    Ok(Json(comment))
}

/// DELETE /titles/{title_id}/reviews/{review_id}/comments/{comment_id}/
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams((title_id, review_id, comment_id)): PathParams<(i32, i32, i32)>,
) -> Result<StatusCode, ApiError> {
    state
        .review_service()
        .delete_comment(
            caller.actor(),
            TitleId::new(title_id),
            ReviewId::new(review_id),
            CommentId::new(comment_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
