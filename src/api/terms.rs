//! Handlers shared by `/categories/` and `/genres/`.

use axum::{Json, http::StatusCode, http::Uri};

use super::validation::{non_blank, page_request, paginate};
use super::{ApiError, AppState, Caller, Paginated, SearchQuery};
use crate::services::{TermInfo, TermInput, TermKind};

pub async fn list(
    state: &AppState,
    caller: &Caller,
    kind: TermKind,
    query: SearchQuery,
    uri: &Uri,
) -> Result<Json<Paginated<TermInfo>>, ApiError> {
    let pagination = state.config().read().await.pagination.clone();
    let request = page_request(query.page, query.page_size, &pagination)?;
    let search = non_blank(query.search);

    let page = state
        .catalog_service()
        .list_terms(caller.actor(), kind, search.as_deref(), request)
        .await?;

    Ok(Json(paginate(page, request, uri)?))
}

pub async fn get(
    state: &AppState,
    caller: &Caller,
    kind: TermKind,
    slug: &str,
) -> Result<Json<TermInfo>, ApiError> {
    let term = state
        .catalog_service()
        .get_term(caller.actor(), kind, slug)
        .await?;
    Ok(Json(term))
}

pub async fn create(
    state: &AppState,
    caller: &Caller,
    kind: TermKind,
    input: TermInput,
) -> Result<(StatusCode, Json<TermInfo>), ApiError> {
    let term = state
        .catalog_service()
        .create_term(caller.actor(), kind, input)
        .await?;
    Ok((StatusCode::CREATED, Json(term)))
}

pub async fn update(
    state: &AppState,
    caller: &Caller,
    kind: TermKind,
    slug: &str,
    input: TermInput,
) -> Result<Json<TermInfo>, ApiError> {
    let term = state
        .catalog_service()
        .update_term(caller.actor(), kind, slug, input)
        .await?;
    Ok(Json(term))
}

pub async fn delete(
    state: &AppState,
    caller: &Caller,
    kind: TermKind,
    slug: &str,
) -> Result<StatusCode, ApiError> {
    state
        .catalog_service()
        .delete_term(caller.actor(), kind, slug)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
