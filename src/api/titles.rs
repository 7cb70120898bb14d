use axum::{
    Extension, Json,
    extract::{OriginalUri, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{JsonBody, PathParams, QueryParams};
use super::validation::{non_blank, page_request, paginate};
use super::{ApiError, AppState, Caller, Paginated, TitleQuery};
use crate::db::repositories::title::TitleFilter;
use crate::domain::TitleId;
use crate::services::{CatalogError, TitleInfo, TitleInput};

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(errors) => Self::FieldErrors(errors),
            CatalogError::NotFound(resource) => Self::not_found(&resource),
            CatalogError::Denied(denied) => denied.into(),
            CatalogError::Conflict(msg) => Self::Conflict(msg),
            CatalogError::Database(msg) => Self::DatabaseError(msg),
            CatalogError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

/// GET /titles/
///
/// Filters `year`, `name`, `genre` and `category` are combined with AND.
pub async fn list_titles(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    OriginalUri(uri): OriginalUri,
    QueryParams(query): QueryParams<TitleQuery>,
) -> Result<Json<Paginated<TitleInfo>>, ApiError> {
    let pagination = state.config().read().await.pagination.clone();
    let request = page_request(query.page, query.page_size, &pagination)?;

    let filter = TitleFilter {
        year: query.year,
        name: non_blank(query.name),
        genre: non_blank(query.genre),
        category: non_blank(query.category),
    };

    let page = state
        .catalog_service()
        .list_titles(caller.actor(), &filter, request)
        .await?;

    Ok(Json(paginate(page, request, &uri)?))
}

/// GET /titles/{title_id}/
pub async fn get_title(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<TitleInfo>, ApiError> {
    let title = state
        .catalog_service()
        .get_title(caller.actor(), TitleId::new(id))
        .await?;
    Ok(Json(title))
}

/// POST /titles/
pub async fn create_title(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<TitleInput>,
) -> Result<(StatusCode, Json<TitleInfo>), ApiError> {
    let title = state
        .catalog_service()
        .create_title(caller.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(title)))
}

/// PATCH /titles/{title_id}/
pub async fn update_title(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(id): PathParams<i32>,
    JsonBody(input): JsonBody<TitleInput>,
) -> Result<Json<TitleInfo>, ApiError> {
    let title = state
        .catalog_service()
        .update_title(caller.actor(), TitleId::new(id), input)
        .await?;
    Ok(Json(title))
}

/// DELETE /titles/{title_id}/
pub async fn delete_title(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(id): PathParams<i32>,
) -> Result<StatusCode, ApiError> {
    state
        .catalog_service()
        .delete_title(caller.actor(), TitleId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
