//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_NUMBER, MAX_PAGE_SIZE};

/// Pagination query parameters shared by every list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (capped at 100)
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    /// Page number with 0 treated as the first page, capped at [`MAX_PAGE_NUMBER`]
    pub fn page(&self) -> u64 {
        self.page.clamp(1, MAX_PAGE_NUMBER)
    }

    /// Zero-based page index for the database paginator
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

/// A page of rows together with the total row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// Convert every item, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if per_page > 0 {
            total.div_ceil(per_page)
        } else {
            0
        };

        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
                has_next: page < total_pages,
                has_previous: page > 1,
            },
        }
    }

    /// Build the response for a repository page.
    pub fn from_page(page: Page<T>, params: &PaginationParams) -> Self {
        Self::new(page.items, params.page(), params.limit(), page.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_capped() {
        let params = PaginationParams {
            page: 1,
            per_page: 1_000,
        };
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let params = PaginationParams {
            page: 0,
            per_page: 20,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_index(), 0);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let params = PaginationParams {
            page: u64::MAX,
            per_page: 1_000,
        };
        assert_eq!(params.page(), MAX_PAGE_NUMBER);
        assert_eq!(
            params.page_index() * params.limit(),
            (MAX_PAGE_NUMBER - 1) * MAX_PAGE_SIZE
        );
    }

    #[test]
    fn test_meta_flags() {
        let middle = Paginated::new(vec![(); 20], 2, 20, 45);
        assert_eq!(middle.meta.total_pages, 3);
        assert!(middle.meta.has_next);
        assert!(middle.meta.has_previous);

        let empty = Paginated::<()>::new(vec![], 1, 20, 0);
        assert_eq!(empty.meta.total_pages, 0);
        assert!(!empty.meta.has_next);
        assert!(!empty.meta.has_previous);
    }
}
