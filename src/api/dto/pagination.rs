//! Pagination query parameters and paged responses.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::error::AppError;
use serde_json::json;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination query parameters.
///
/// Uses `serde_with` to parse page numbers from query strings as integers,
/// which also keeps them working inside `#[serde(flatten)]`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl PaginationParams {
    /// Validates the parameters and returns `(page, page_size)`.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `page_size`: 20
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the page is 0 or the page size is
    /// outside 1 to 100.
    pub fn resolve(&self) -> Result<(u32, u32), AppError> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(AppError::bad_request(
                "Page must be greater than 0",
                json!({ "field": "page" }),
            ));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::bad_request(
                format!("Page size must be between 1 and {MAX_PAGE_SIZE}"),
                json!({ "field": "page_size" }),
            ));
        }

        Ok((page, page_size))
    }
}

/// Pagination metadata for responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

/// One page of results.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub pagination: PaginationMeta,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total_items: i64) -> Self {
        let total_items_unsigned = u64::try_from(total_items).unwrap_or(0);
        let total_pages =
            u32::try_from(total_items_unsigned.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX);

        Self {
            pagination: PaginationMeta {
                page,
                page_size,
                total_items,
                total_pages,
            },
            items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            pagination: self.pagination,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, page_size: Option<u32>) -> PaginationParams {
        PaginationParams { page, page_size }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(params(None, None).resolve().unwrap(), (1, 20));
    }

    #[test]
    fn test_custom_page_and_size() {
        assert_eq!(params(Some(3), Some(50)).resolve().unwrap(), (3, 50));
    }

    #[test]
    fn test_page_zero_is_error() {
        let err = params(Some(0), None).resolve().unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(params(None, Some(0)).resolve().is_err());
        assert!(params(None, Some(1)).resolve().is_ok());
        assert!(params(None, Some(100)).resolve().is_ok());
        assert!(params(None, Some(101)).resolve().is_err());
    }

    #[test]
    fn test_page_total_pages_rounds_up() {
        let page = Page::new(vec![1, 2], 1, 20, 41);
        assert_eq!(page.pagination.total_pages, 3);

        let empty = Page::<i32>::new(vec![], 1, 20, 0);
        assert_eq!(empty.pagination.total_pages, 0);
    }

    #[test]
    fn test_page_total_pages_edge_counts() {
        assert_eq!(Page::<i32>::new(vec![], 1, 20, 40).pagination.total_pages, 2);
        assert_eq!(Page::<i32>::new(vec![], 1, 1, 1).pagination.total_pages, 1);
        assert_eq!(Page::<i32>::new(vec![], 1, 20, -5).pagination.total_pages, 0);
        assert_eq!(
            Page::<i32>::new(vec![], 1, 1, i64::MAX).pagination.total_pages,
            u32::MAX
        );
    }

    #[test]
    fn test_query_string_parsing() {
        let p: PaginationParams = serde_json::from_str(r#"{"page": "2"}"#).unwrap();
        assert_eq!(p.page, Some(2));
        assert_eq!(p.page_size, None);
    }
}
