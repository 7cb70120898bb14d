pub mod category;
pub mod comment;
pub mod genre;
pub mod review;
pub mod title;
pub mod user;

/// Current UTC time in the fixed-width RFC 3339 form stored in timestamp
/// columns, so that string order matches time order.
#[must_use]
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// 1-based page selection for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Zero-based index as expected by `Paginator::fetch_page`.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.page - 1
    }

    /// Whether this page starts beyond `total` items. Page 1 always exists,
    /// even for an empty list.
    #[must_use]
    pub const fn is_past_end(&self, total: u64) -> bool {
        self.page > 1 && self.index().saturating_mul(self.page_size) >= total
    }
}

/// One page of rows plus the total row count of the unpaged query.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_bounds() {
        let first = PageRequest::new(0, 0);
        assert_eq!(first.page, 1);
        assert_eq!(first.page_size, 1);
        assert!(!first.is_past_end(0));

        let second = PageRequest::new(2, 10);
        assert_eq!(second.index(), 1);
        assert!(second.is_past_end(10));
        assert!(!second.is_past_end(11));

        let huge = PageRequest::new(u64::MAX, u64::MAX);
        assert!(huge.is_past_end(u64::MAX));
    }
}
