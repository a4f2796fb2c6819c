//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_NUMBER, MAX_PAGE_SIZE};

/// Pagination query parameters, reusable across all list endpoints
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (capped at 100)
    #[serde(default = "default_per_page", alias = "limit")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Requested page, clamped to `1..=MAX_PAGE_NUMBER`
    pub fn page(&self) -> u64 {
        self.page.clamp(1, MAX_PAGE_NUMBER)
    }

    /// Zero-based page index for sea-orm paginators
    pub fn page_index(&self) -> u64 {
        self.page() - 1
    }

    /// Get limit capped at maximum
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A page of results plus its metadata
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let per_page = params.limit();
        let total_pages = total.div_ceil(per_page);

        Self {
            data,
            meta: PaginationMeta {
                page: params.page(),
                per_page,
                total,
                total_pages,
            },
        }
    }

    /// Convert every item, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_capped() {
        let params = PaginationParams::new(1, 1000);
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
        assert_eq!(PaginationParams::new(1, 0).limit(), 1);
    }

    #[test]
    fn test_page_zero_is_treated_as_first() {
        let params = PaginationParams::new(0, 10);
        assert_eq!(params.page_index(), 0);
        assert_eq!(PaginationParams::new(3, 10).page_index(), 2);
    }

    #[test]
    fn test_huge_page_is_clamped() {
        let params = PaginationParams::new(u64::MAX, MAX_PAGE_SIZE);
        assert_eq!(params.page(), MAX_PAGE_NUMBER);
        assert!(params.page_index().checked_mul(params.limit()).is_some());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Paginated::new(vec![1, 2, 3], &PaginationParams::new(1, 3), 7);
        assert_eq!(page.meta.total_pages, 3);
        let empty: Paginated<i32> = Paginated::new(vec![], &PaginationParams::default(), 0);
        assert_eq!(empty.meta.total_pages, 0);
    }

    #[test]
    fn test_limit_alias_deserializes() {
        let params: PaginationParams = serde_json::from_str(r#"{"page":2,"limit":5}"#).unwrap();
        assert_eq!(params.page, 2);
        assert_eq!(params.per_page, 5);
    }
}
