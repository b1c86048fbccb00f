//! Sorting and paging rules shared by the storefront listings.

use serde::{Deserialize, Serialize};

/// Hard cap on page size regardless of what the caller asks for.
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    PrecioAsc,
    PrecioDesc,
    #[default]
    AlfabeticoAsc,
    AlfabeticoDesc,
}

impl SortOrder {
    /// Parse the storefront's `orden` parameter. Unknown or missing values
    /// fall back to alphabetical ascending.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("precio_asc") => Self::PrecioAsc,
            Some("precio_desc") => Self::PrecioDesc,
            Some("alfabetico_desc") => Self::AlfabeticoDesc,
            _ => Self::AlfabeticoAsc,
        }
    }

    /// `ORDER BY` fragment for a `products` table aliased as `p`.
    #[must_use]
    pub fn order_by_sql(self) -> &'static str {
        match self {
            Self::PrecioAsc => "p.final_price ASC, p.id ASC",
            Self::PrecioDesc => "p.final_price DESC, p.id ASC",
            Self::AlfabeticoAsc => "p.title ASC, p.id ASC",
            Self::AlfabeticoDesc => "p.title DESC, p.id ASC",
        }
    }
}

/// A normalized `(page, limit)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Pages at or below zero become page 1; a missing or non-positive limit
    /// becomes `default_limit`; limits above [`MAX_PAGE_SIZE`] are capped.
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_SIZE);
        Self { page, limit }
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Whether this page lies past the last page of `total` records.
    #[must_use]
    pub fn is_past_end(&self, total: i64) -> bool {
        self.page > total_pages(total, self.limit)
    }
}

/// `ceil(total / limit)`, zero when there are no records.
#[must_use]
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Page numbers a pager should render around the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub pages: Vec<i64>,
    pub start_ellipsis: bool,
    pub end_ellipsis: bool,
}

/// First page, last page, and the pages adjacent to `current`.
#[must_use]
pub fn page_window(current: i64, total: i64) -> PageWindow {
    let pages = (1..=total)
        .filter(|p| *p == 1 || *p == total || (p - current).abs() <= 1)
        .collect();
    PageWindow {
        pages,
        start_ellipsis: current > 3,
        end_ellipsis: current < total - 2,
    }
}
