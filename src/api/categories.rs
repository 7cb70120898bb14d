use axum::{
    Extension, Json,
    extract::{OriginalUri, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{JsonBody, PathParams, QueryParams};
use super::{ApiError, AppState, Caller, Paginated, SearchQuery, terms};
use crate::services::{TermInfo, TermInput, TermKind};

/// GET /categories/
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    OriginalUri(uri): OriginalUri,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Paginated<TermInfo>>, ApiError> {
    terms::list(&state, &caller, TermKind::Category, query, &uri).await
}

/// GET /categories/{slug}/
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(slug): PathParams<String>,
) -> Result<Json<TermInfo>, ApiError> {
    terms::get(&state, &caller, TermKind::Category, &slug).await
}

/// POST /categories/
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<TermInput>,
) -> Result<(StatusCode, Json<TermInfo>), ApiError> {
    terms::create(&state, &caller, TermKind::Category, input).await
}

/// PATCH /categories/{slug}/
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(slug): PathParams<String>,
    JsonBody(input): JsonBody<TermInput>,
) -> Result<Json<TermInfo>, ApiError> {
    terms::update(&state, &caller, TermKind::Category, &slug, input).await
}

/// DELETE /categories/{slug}/
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(slug): PathParams<String>,
) -> Result<StatusCode, ApiError> {
    terms::delete(&state, &caller, TermKind::Category, &slug).await
}
