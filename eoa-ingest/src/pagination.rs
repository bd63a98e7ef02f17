//! Pagination utilities for the read API
//!
//! Out-of-range `page`/`per_page`/`limit` values fall back to defaults
//! instead of producing an error.

use serde::Serialize;

/// Default page size of the list endpoint
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Default length of the "latest" listing
pub const DEFAULT_LATEST_LIMIT: i64 = 10;

/// Largest accepted page size or limit
pub const MAX_PER_PAGE: i64 = 100;

/// Sanitize a requested page number (1-indexed)
///
/// Pages whose offset would overflow at `per_page` fall back to 1.
pub fn sanitize_page(requested: Option<i64>, per_page: i64) -> i64 {
    requested
        .filter(|page| *page >= 1 && (page - 1).checked_mul(per_page).is_some())
        .unwrap_or(1)
}

/// Sanitize a requested size; anything outside `[1, MAX_PER_PAGE]` becomes `default`
pub fn sanitize_size(requested: Option<i64>, default: i64) -> i64 {
    requested
        .filter(|size| (1..=MAX_PER_PAGE).contains(size))
        .unwrap_or(default)
}

/// Pagination metadata returned alongside list results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    pub per_page: i64,
    pub total_items: i64,
    /// Zero when there are no items
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Calculate pagination metadata for an already sanitized page and size
    ///
    /// A page past the end is reported as-is (with no items) rather than
    /// clamped to the last page.
    pub fn new(page: i64, per_page: i64, total_items: i64) -> Self {
        let total_pages = if total_items > 0 {
            (total_items + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            page,
            per_page,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Offset for SQL LIMIT/OFFSET query
    pub fn offset(page: i64, per_page: i64) -> i64 {
        (page - 1).saturating_mul(per_page)
    }
}
