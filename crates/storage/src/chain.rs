//! Append-only version chain
//!
//! Rows of one series (one definition's history, one parent's snapshots) kept
//! oldest-first so the as-of lookup is a binary search and appends are O(1).

use crate::resolver::AsOfResolver;
use ledgerview_core::{StateVersion, VersionedRow};

/// Series of rows sorted ascending by `(from_version, row_id)`.
#[derive(Debug, Clone)]
pub struct VersionChain<R> {
    rows: Vec<R>,
}

impl<R> Default for VersionChain<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: VersionedRow> VersionChain<R> {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Version of the newest row, if any
    pub fn latest_version(&self) -> Option<StateVersion> {
        self.rows.last().map(|row| row.from_version())
    }

    /// Append a row.
    ///
    /// Rows must arrive with non-decreasing `from_version` and increasing
    /// `row_id`. On a version regression the row is rejected and the
    /// version of the current newest row is returned.
    pub fn push(&mut self, row: R) -> Result<(), StateVersion> {
        if let Some(latest) = self.rows.last() {
            if row.from_version() < latest.from_version() {
                return Err(latest.from_version());
            }
            debug_assert!(row.row_id() > latest.row_id());
        }
        self.rows.push(row);
        Ok(())
    }

    /// Row current as of `as_of`
    #[inline]
    pub fn at(&self, as_of: StateVersion) -> Option<&R> {
        AsOfResolver::resolve_sorted(&self.rows, as_of)
    }

    /// Newest row
    #[inline]
    pub fn latest(&self) -> Option<&R> {
        self.rows.last()
    }

    /// Rows with `from_version <= as_of`, newest first, at most `limit`
    pub fn history(&self, as_of: StateVersion, limit: Option<usize>) -> Vec<&R> {
        let visible = self.rows.partition_point(|row| row.from_version() <= as_of);
        let iter = self.rows[..visible].iter().rev();
        match limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the chain has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate oldest first
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.iter()
    }
}
