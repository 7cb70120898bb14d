use axum::{
    Extension, Json,
    extract::{OriginalUri, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{JsonBody, PathParams, QueryParams};
use super::{ApiError, AppState, Caller, Paginated, SearchQuery, terms};
use crate::services::{TermInfo, TermInput, TermKind};

/// GET /genres/
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    OriginalUri(uri): OriginalUri,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Paginated<TermInfo>>, ApiError> {
    terms::list(&state, &caller, TermKind::Genre, query, &uri).await
}

/// GET /genres/{slug}/
pub async fn get_genre(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(slug): PathParams<String>,
) -> Result<Json<TermInfo>, ApiError> {
    terms::get(&state, &caller, TermKind::Genre, &slug).await
}

/// POST /genres/
pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<TermInput>,
) -> Result<(StatusCode, Json<TermInfo>), ApiError> {
    terms::create(&state, &caller, TermKind::Genre, input).await
}

/// PATCH /genres/{slug}/
pub async fn update_genre(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(slug): PathParams<String>,
    JsonBody(input): JsonBody<TermInput>,
) -> Result<Json<TermInfo>, ApiError> {
    terms::update(&state, &caller, TermKind::Genre, &slug, input).await
}

/// DELETE /genres/{slug}/
pub async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    PathParams(slug): PathParams<String>,
) -> Result<StatusCode, ApiError> {
    terms::delete(&state, &caller, TermKind::Genre, &slug).await
}
