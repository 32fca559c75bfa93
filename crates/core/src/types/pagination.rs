//! Page/offset math shared by the customers page and the JSON API.

use serde::{Deserialize, Serialize};

/// Page size used when the client does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u32 = 100;

/// A validated page request.
///
/// Pages are 1-based. Out-of-range input is clamped rather than rejected:
/// page 0 or a negative page becomes page 1, and the page size is held to
/// `1..=MAX_PER_PAGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = page
            .unwrap_or(1)
            .clamp(1, i64::from(u32::MAX))
            .try_into()
            .unwrap_or(1);
        let per_page = per_page
            .unwrap_or_else(|| i64::from(DEFAULT_PER_PAGE))
            .clamp(1, i64::from(MAX_PER_PAGE))
            .try_into()
            .unwrap_or(DEFAULT_PER_PAGE);
        Self { page, per_page }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Row offset for `LIMIT/OFFSET` queries.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Totals describing one page of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub total: i64,
    pub pages: u32,
    pub current_page: u32,
    pub per_page: u32,
}

impl PageInfo {
    /// `pages` is the ceiling of `total / per_page`, and zero when there
    /// are no rows.
    #[must_use]
    pub fn new(total: i64, request: PageRequest) -> Self {
        let total = total.max(0);
        let per_page = i64::from(request.per_page());
        let pages = u32::try_from((total + per_page - 1) / per_page).unwrap_or(u32::MAX);
        Self {
            total,
            pages,
            current_page: request.page(),
            per_page: request.per_page(),
        }
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.pages
    }

    #[must_use]
    pub const fn prev_page(&self) -> u32 {
        self.current_page.saturating_sub(1)
    }

    #[must_use]
    pub const fn next_page(&self) -> u32 {
        self.current_page.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_clamps_out_of_range_input() {
        let req = PageRequest::new(Some(0), Some(0));
        assert_eq!((req.page(), req.per_page()), (1, 1));

        let req = PageRequest::new(Some(-4), Some(10_000));
        assert_eq!((req.page(), req.per_page()), (1, MAX_PER_PAGE));
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::new(Some(3), Some(50));
        assert_eq!(req.offset(), 100);
        assert_eq!(req.limit(), 50);
    }

    #[test]
    fn test_page_count_rounds_up() {
        let req = PageRequest::new(Some(1), Some(50));
        assert_eq!(PageInfo::new(1000, req).pages, 20);
        assert_eq!(PageInfo::new(1001, req).pages, 21);
        assert_eq!(PageInfo::new(1, req).pages, 1);
        assert_eq!(PageInfo::new(0, req).pages, 0);
    }

    #[test]
    fn test_prev_next_flags() {
        let first = PageInfo::new(120, PageRequest::new(Some(1), Some(50)));
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last = PageInfo::new(120, PageRequest::new(Some(3), Some(50)));
        assert!(last.has_prev());
        assert!(!last.has_next());
        assert_eq!(last.prev_page(), 2);
    }

    #[test]
    fn test_page_past_end_has_no_next() {
        let info = PageInfo::new(10, PageRequest::new(Some(9), Some(50)));
        assert_eq!(info.pages, 1);
        assert!(!info.has_next());
        assert!(info.has_prev());
    }

    #[test]
    fn test_empty_result_has_neither() {
        let info = PageInfo::new(0, PageRequest::default());
        assert!(!info.has_prev());
        assert!(!info.has_next());
    }
}
