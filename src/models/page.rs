//! Page selection for the validation history listing.

use serde::{Deserialize, Serialize};

/// `?page=&per_page=` query for history. Out-of-range values are clamped,
/// never rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    pub const DEFAULT_PER_PAGE: i64 = 25;
    pub const MAX_PER_PAGE: i64 = 100;
    /// Highest page number honored; later pages are simply empty.
    pub const MAX_PAGE: i64 = 1_000_000;

    /// 1-based page number, clamped to `1..=MAX_PAGE`.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, Self::MAX_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// One page of results plus the totals a client needs to page further.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, query: &PageQuery) -> Self {
        let per_page = query.limit();
        let counted = total.max(0);
        Self {
            items,
            total,
            page: query.page(),
            per_page,
            total_pages: counted / per_page + i64::from(counted % per_page != 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<i64>, per_page: Option<i64>) -> PageQuery {
        PageQuery { page, per_page }
    }

    #[test]
    fn defaults_to_first_page() {
        let q = PageQuery::default();
        assert_eq!((q.page(), q.limit(), q.offset()), (1, 25, 0));
    }

    #[test]
    fn per_page_is_clamped() {
        assert_eq!(query(None, Some(500)).limit(), 100);
        assert_eq!(query(None, Some(0)).limit(), 1);
        assert_eq!(query(None, Some(-3)).limit(), 1);
    }

    #[test]
    fn offset_skips_earlier_pages() {
        assert_eq!(query(Some(3), Some(10)).offset(), 20);
        assert_eq!(query(Some(-7), Some(10)).offset(), 0);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let q = query(Some(i64::MAX), Some(100));
        assert_eq!(q.page(), PageQuery::MAX_PAGE);
        assert_eq!(q.offset(), (PageQuery::MAX_PAGE - 1) * 100);
        assert!(q.offset() >= 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let q = query(Some(1), Some(10));
        assert_eq!(Page::new(vec![1, 2, 3], 25, &q).total_pages, 3);
        assert_eq!(Page::new(Vec::<i32>::new(), 0, &q).total_pages, 0);
        assert_eq!(Page::new(vec![1], 10, &q).total_pages, 1);
    }
}
