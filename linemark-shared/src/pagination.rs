//! Page / limit / search query parameters shared by list endpoints
//!
//! `page` is 1-based (default 1) and `limit` is 1..=100 (default 20).
//! Out-of-range values are rejected rather than silently adjusted.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaginationError {
    #[error("page must be at least 1")]
    InvalidPage,

    #[error("limit must be between 1 and 100")]
    InvalidLimit,
}

impl PaginationError {
    /// Query parameter at fault
    pub fn field(&self) -> &'static str {
        match self {
            PaginationError::InvalidPage => "page",
            PaginationError::InvalidLimit => "limit",
        }
    }
}

/// Raw query string parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Free-text search
    pub q: Option<String>,
}

/// Validated paging window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    pub fn resolve(&self) -> Result<Pagination, PaginationError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PaginationError::InvalidLimit);
        }
        Ok(Pagination { page, limit })
    }

    /// `ILIKE` pattern for the search term, `None` when blank
    pub fn search_pattern(&self) -> Option<String> {
        search_pattern(self.q.as_deref())
    }
}

/// Builds an `ILIKE` pattern, escaping the wildcard characters in `term`
pub fn search_pattern(term: Option<&str>) -> Option<String> {
    let term = term?.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

/// One page of results plus totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total: i64) -> Self {
        let limit = i64::from(pagination.limit);
        Self {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}
