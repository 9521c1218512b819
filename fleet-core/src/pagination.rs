//! Pagination types
//!
//! `Page::new` rejects a zero page number or page size, so a listing call
//! fails before any query is issued.

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Maximum items per page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default items per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Validated pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,
    /// Items per page (1..=100)
    pub size: u32,
}

impl Page {
    /// Create a page window.
    ///
    /// # Example
    /// ```
    /// use fleet_core::Page;
    ///
    /// assert!(Page::new(1, 10).is_ok());
    /// assert!(Page::new(0, 10).is_err());
    /// assert!(Page::new(1, 0).is_err());
    /// ```
    pub fn new(number: u32, size: u32) -> Result<Self, ValidationError> {
        if number == 0 {
            return Err(ValidationError::OutOfRange {
                field: "pageNumber",
                min: 1,
                max: u32::MAX as i64,
                value: 0,
            });
        }
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(ValidationError::OutOfRange {
                field: "pageSize",
                min: 1,
                max: MAX_PAGE_SIZE as i64,
                value: size as i64,
            });
        }
        Ok(Self { number, size })
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        (self.number as i64 - 1) * self.size as i64
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> i64 {
        self.size as i64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Query parameters for paginated listings (`?pageNumber=1&pageSize=10`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl TryFrom<PageParams> for Page {
    type Error = ValidationError;

    fn try_from(params: PageParams) -> Result<Self, Self::Error> {
        Self::new(
            params.page_number.unwrap_or(1),
            params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    pub page_number: u32,
    pub page_size: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        Self {
            items,
            total,
            page_number: page.number,
            page_size: page.size,
        }
    }

    /// Total number of pages (at least 1).
    pub fn total_pages(&self) -> u32 {
        if self.total <= 0 {
            return 1;
        }
        let total = self.total as u64;
        let size = self.page_size as u64;
        total.div_ceil(size).max(1) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page_number > 1
    }

    /// Convert item type, keeping the window.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn offset_calculation() {
        assert_eq!(Page::new(1, 10).unwrap().offset(), 0);
        assert_eq!(Page::new(2, 10).unwrap().offset(), 10);
        assert_eq!(Page::new(3, 25).unwrap().offset(), 50);
    }

    #[test]
    fn rejects_zero_page_number() {
        let err = Page::new(0, 10).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: "pageNumber",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_and_oversized_page_size() {
        assert!(Page::new(1, 0).is_err());
        assert!(Page::new(1, 101).is_err());
        assert!(Page::new(1, 100).is_ok());
    }

    #[test]
    fn params_default_to_first_page() {
        let page = Page::try_from(PageParams::default()).unwrap();
        assert_eq!(page, Page::default());
    }

    #[test]
    fn params_parse_camel_case() {
        let params: PageParams =
            serde_json::from_str(r#"{"pageNumber": 2, "pageSize": 5}"#).unwrap();
        let page = Page::try_from(params).unwrap();
        assert_eq!(page.offset(), 5);
    }

    #[test]
    fn total_pages_and_navigation() {
        let page = Page::new(1, 10).unwrap();
        let empty: Paginated<()> = Paginated::new(vec![], 0, page);
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_next());

        let many: Paginated<()> = Paginated::new(vec![], 25, page);
        assert_eq!(many.total_pages(), 3);
        assert!(many.has_next());
        assert!(!many.has_prev());

        let last: Paginated<()> = Paginated::new(vec![], 30, Page::new(3, 10).unwrap());
        assert!(!last.has_next());
        assert!(last.has_prev());
    }

    proptest! {
        #[test]
        fn offset_is_never_negative(number in 1u32..10_000, size in 1u32..=MAX_PAGE_SIZE) {
            let page = Page::new(number, size).unwrap();
            prop_assert!(page.offset() >= 0);
            prop_assert_eq!(page.offset() % size as i64, 0);
        }
    }
}
