//! Pagination over stable listings.
//!
//! Pages are 1-based. For page `p` of size `n` the window starts at
//! `(p - 1) * n`; the total page count is `ceil(count / n)`. Asking for a
//! page past the end is not an error: it yields no items and the real page
//! count.

use serde::{Deserialize, Serialize};

/// One window of a paginated listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The 1-based page number that was served.
    pub number: u64,
    pub total_pages: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            number: self.number,
            total_pages: self.total_pages,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// Offset of the first item on `page`. Page `0` is treated as page `1`.
pub fn page_offset(page: u64, page_size: u64) -> u64 {
    page.max(1).saturating_sub(1).saturating_mul(page_size)
}

/// Number of pages needed for `count` items, `ceil(count / page_size)`.
pub fn total_pages(count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Parse a caller-supplied page number.
///
/// Missing, malformed, or zero input silently becomes page 1; malformed input
/// is logged and otherwise ignored.
pub fn parse_page(raw: &str) -> u64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 1;
    }
    match raw.parse::<u64>() {
        Ok(0) => 1,
        Ok(page) => page,
        Err(_) => {
            tracing::warn!(page = raw, "malformed page parameter");
            1
        }
    }
}
