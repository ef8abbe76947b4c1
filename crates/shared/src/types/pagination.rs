//! Paging over transaction histories.
//!
//! Fund and asset histories grow without bound, so their list queries take a
//! `PageRequest` and answer with a `PageResponse`.

use serde::{Deserialize, Serialize};

/// Which slice of a history to load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Rows per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Rows to skip before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from((self.page.saturating_sub(1)) * self.per_page)
    }

    /// Rows to load for this page.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

/// One page of rows plus the totals needed to page further.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Rows on this page, newest first as the repositories order them.
    pub data: Vec<T>,
    /// Position of this page within the history.
    pub meta: PageMeta,
}

/// Page position and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page number of `data`.
    pub page: u32,
    /// Requested rows per page.
    pub per_page: u32,
    /// Rows in the whole history.
    pub total: u64,
    /// Pages in the whole history, at least 1.
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Wraps one page of rows with its totals.
    #[must_use]
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if total == 0 || per_page == 0 {
            1
        } else {
            u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
        };

        Self {
            data,
            meta: PageMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
