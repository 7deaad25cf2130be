//! Pagination cursor for user lists
//!
//! Pages are 0-based; the caller owns the cursor and advances it after each
//! successful load.

use serde::{Deserialize, Serialize};

/// `(current_page, page_size)` pair used to compute a fetch offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    /// Current page number (0-indexed)
    pub current_page: u32,
    /// Users per page
    pub page_size: u32,
}

impl PaginationCursor {
    pub fn new(current_page: u32, page_size: u32) -> Self {
        Self {
            current_page,
            page_size,
        }
    }

    /// First page with the given size
    pub fn first(page_size: u32) -> Self {
        Self::new(0, page_size)
    }

    /// Offset for the remote LIMIT/OFFSET query
    ///
    /// Saturates instead of overflowing for absurd page numbers.
    pub fn offset(&self) -> u64 {
        u64::from(self.current_page).saturating_mul(u64::from(self.page_size))
    }

    /// Whether this cursor points at the first page
    pub fn is_first_page(&self) -> bool {
        self.current_page == 0
    }

    /// Cursor for the following page
    pub fn next(&self) -> Self {
        Self::new(self.current_page.saturating_add(1), self.page_size)
    }
}
