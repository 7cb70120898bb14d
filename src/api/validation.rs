//! Query-string handling shared by the list endpoints.

use axum::http::Uri;
use url::form_urlencoded;

use super::{ApiError, Paginated};
use crate::config::PaginationConfig;
use crate::db::{Page, PageRequest};

const INVALID_PAGE: &str = "Invalid page.";

/// Resolves `?page` and `?page_size` against the configured bounds.
///
/// `page=0` and pages whose offset overflows are rejected; `page_size` is clamped to `max_page_size` and
/// falls back to the default when zero or absent.
pub fn page_request(
    page: Option<u64>,
    page_size: Option<u64>,
    config: &PaginationConfig,
) -> Result<PageRequest, ApiError> {
    let page = page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::NotFound(INVALID_PAGE.to_string()));
    }

    let page_size = match page_size {
        Some(0) | None => config.page_size,
        Some(size) => size.min(config.max_page_size),
    };

    // The row offset has to fit the database's signed 64-bit OFFSET.
    let offset = (page - 1).checked_mul(page_size);
    if !offset.is_some_and(|offset| i64::try_from(offset).is_ok()) {
        return Err(ApiError::NotFound(INVALID_PAGE.to_string()));
    }

    Ok(PageRequest::new(page, page_size))
}

/// Blank filter values are treated as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Wraps a page of results with links to its neighbours.
///
/// A page past the end of a non-empty list is a 404.
pub fn paginate<T>(page: Page<T>, request: PageRequest, uri: &Uri) -> Result<Paginated<T>, ApiError> {
    if request.is_past_end(page.total) {
        return Err(ApiError::NotFound(INVALID_PAGE.to_string()));
    }

    let next = (request.page.saturating_mul(request.page_size) < page.total)
        .then(|| page_link(uri, Some(request.page + 1)));
    let previous = (request.page > 1).then(|| {
        let target = request.page - 1;
        page_link(uri, (target > 1).then_some(target))
    });

    Ok(Paginated {
        count: page.total,
        next,
        previous,
        results: page.items,
    })
}

/// `uri` with its `page` parameter replaced by `page` (or removed).
fn page_link(uri: &Uri, page: Option<u64>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if let Some(query) = uri.query() {
        serializer.extend_pairs(form_urlencoded::parse(query.as_bytes()).filter(|(k, _)| k != "page"));
    }
    if let Some(page) = page {
        serializer.append_pair("page", &page.to_string());
    }

    let query = serializer.finish();
    if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{query}", uri.path())
    }
}
