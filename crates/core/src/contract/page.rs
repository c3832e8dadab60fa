//! Page response shape shared by every paginated read

use serde::Serialize;

/// One page of a paginated read.
///
/// `total_count` is read from the totals series of the parent at the pinned
/// version. It is independent of how many items are on this page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page, in scan order
    pub items: Vec<T>,
    /// Opaque cursor for the next page, `None` when pagination is complete
    pub next_cursor: Option<String>,
    /// Total entries of the parent at the pinned version
    pub total_count: u64,
}

impl<T> Page<T> {
    /// Page with no items and no continuation
    pub fn empty(total_count: u64) -> Self {
        Page {
            items: Vec::new(),
            next_cursor: None,
            total_count,
        }
    }

    /// Whether a following page exists
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Map the items to a new type, keeping cursor and total
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            total_count: self.total_count,
        }
    }
}
