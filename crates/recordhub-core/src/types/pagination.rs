//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 25;
/// Maximum page size.
const MAX_PAGE_SIZE: u64 = 100;

/// Inclusive row range `[from, to]`, as understood by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    /// First row (0-based).
    pub from: u64,
    /// Last row, inclusive.
    pub to: u64,
}

impl RowRange {
    /// Builds the range `[offset, offset + limit - 1]`.
    ///
    /// Returns `None` for a zero limit, which selects nothing.
    pub fn from_limit_offset(limit: u64, offset: u64) -> Option<Self> {
        if limit == 0 {
            return None;
        }
        Some(Self {
            from: offset,
            to: offset.saturating_add(limit - 1),
        })
    }

    /// Number of rows the range spans.
    pub fn len(&self) -> u64 {
        self.to.saturating_sub(self.from).saturating_add(1)
    }

    /// Always false; a range spans at least one row.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Request parameters for page-based listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Calculate the row offset, saturating for out-of-range pages.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Return the row limit.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
