//! Page-number pagination shared by the listing views

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// `?page=` query parameter (1-based)
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// A validated page request: number, size and row offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
    offset: i64,
}

impl PageRequest {
    /// Page numbers below 1, or so large their offset overflows, do not exist
    pub fn new(query: PageQuery, per_page: i64) -> AppResult<Self> {
        let page = query.page.unwrap_or(1);
        let offset = page
            .checked_sub(1)
            .filter(|previous| *previous >= 0)
            .and_then(|previous| previous.checked_mul(per_page))
            .ok_or_else(|| AppError::NotFound(format!("Invalid page ({})", page)))?;
        Ok(Self {
            page,
            per_page,
            offset,
        })
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Records on this page
    pub items: Vec<T>,
    /// Total number of records across all pages
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Records per page
    pub per_page: i64,
    /// Number of pages (at least 1)
    pub num_pages: i64,
    pub is_paginated: bool,
}

impl<T> Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Build a page, refusing page numbers past the last one.
    ///
    /// Page 1 always exists, even when there are no records.
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> AppResult<Self> {
        let num_pages = num_pages(total, request.per_page);
        if request.page > num_pages {
            return Err(AppError::NotFound(format!(
                "Invalid page ({}): that page contains no results",
                request.page
            )));
        }
        Ok(Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            num_pages,
            is_paginated: num_pages > 1,
        })
    }
}

fn num_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        1
    } else {
        (total + per_page - 1) / per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Genre;

    fn request(page: i64) -> PageRequest {
        PageRequest::new(PageQuery { page: Some(page) }, 10).unwrap()
    }

    #[test]
    fn test_offsets() {
        assert_eq!(request(1).offset(), 0);
        assert_eq!(request(3).offset(), 20);
        let first = PageRequest::new(PageQuery::default(), 5).unwrap();
        assert_eq!((first.page, first.per_page, first.offset()), (1, 5, 0));
    }

    #[test]
    fn test_rejects_non_positive_page() {
        assert!(matches!(
            PageRequest::new(PageQuery { page: Some(0) }, 10),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            PageRequest::new(PageQuery { page: Some(i64::MIN) }, 10),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_huge_page_is_not_found_instead_of_overflowing() {
        assert!(matches!(
            PageRequest::new(PageQuery { page: Some(i64::MAX) }, 10),
            Err(AppError::NotFound(_))
        ));
        // largest page whose offset still fits
        let last = i64::MAX / 10 + 1;
        assert_eq!(
            PageRequest::new(PageQuery { page: Some(last) }, 10)
                .unwrap()
                .offset(),
            (last - 1) * 10
        );
    }

    #[test]
    fn test_num_pages() {
        assert_eq!(num_pages(0, 10), 1);
        assert_eq!(num_pages(10, 10), 1);
        assert_eq!(num_pages(11, 10), 2);
    }

    #[test]
    fn test_empty_first_page_is_valid() {
        let page = Page::<Genre>::new(vec![], 0, request(1)).unwrap();
        assert_eq!(page.num_pages, 1);
        assert!(!page.is_paginated);
    }

    #[test]
    fn test_page_past_end_is_not_found() {
        assert!(matches!(
            Page::<Genre>::new(vec![], 11, request(3)),
            Err(AppError::NotFound(_))
        ));
        let page = Page::<Genre>::new(vec![], 11, request(2)).unwrap();
        assert!(page.is_paginated);
    }
}
