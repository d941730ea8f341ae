//! Pagination utilities for the fonograma listing
//!
//! The server paginates; the client only clamps page requests and derives the
//! page-number window shown under the table.

use std::ops::RangeInclusive;

use fono_common::api::PageInfo;

/// Page size for the listing
pub const PAGE_SIZE: u32 = 20;

/// Pages shown on each side of the current one
const WINDOW_RADIUS: u32 = 2;

/// Pagination state derived from the server's page metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Total number of rows across all pages
    pub total: u64,
}

impl Pagination {
    /// Trust the server's numbers but keep `page` in bounds
    ///
    /// # Examples
    /// ```
    /// use fono_admin::pagination::Pagination;
    /// use fono_common::api::PageInfo;
    ///
    /// // 45 rows at 20 per page
    /// let p = Pagination::from_page_info(&PageInfo { page: 2, per_page: 20, total: 45, pages: 3 });
    /// assert_eq!(p.page, 2);
    /// assert_eq!(p.total_pages, 3);
    ///
    /// // A page past the end is clamped to the last one
    /// let p = Pagination::from_page_info(&PageInfo { page: 99, per_page: 20, total: 45, pages: 3 });
    /// assert_eq!(p.page, 3);
    /// ```
    pub fn from_page_info(info: &PageInfo) -> Self {
        Self {
            page: info.page.max(1).min(info.pages.max(1)),
            total_pages: info.pages,
            total: info.total,
        }
    }

    /// No controls are rendered for a single page
    pub fn has_controls(&self) -> bool {
        self.total_pages > 1
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page numbers around the current one: `max(1, p-2) ..= min(total, p+2)`
    pub fn window(&self) -> RangeInclusive<u32> {
        let start = self.page.saturating_sub(WINDOW_RADIUS).max(1);
        let end = (self.page + WINDOW_RADIUS).min(self.total_pages.max(1));
        start..=end
    }

    /// `Página p de t (n total)`
    pub fn footer(&self) -> String {
        format!(
            "Página {} de {} ({} total)",
            self.page, self.total_pages, self.total
        )
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 0,
            total: 0,
        }
    }
}
