//! "Latest row not newer than V" lookup
//!
//! Every read path (history, rollup snapshots, totals) resolves a series with
//! the same rule: among rows with `from_version <= as_of`, pick the one with
//! the greatest `(from_version, row_id)`.

use ledgerview_core::{StateVersion, VersionedRow};

/// As-of lookup over versioned rows.
pub struct AsOfResolver;

impl AsOfResolver {
    /// Resolve over rows kept sorted ascending by `(from_version, row_id)`.
    ///
    /// O(log n) via binary search.
    #[inline]
    pub fn resolve_sorted<R: VersionedRow>(rows: &[R], as_of: StateVersion) -> Option<&R> {
        let visible = rows.partition_point(|row| row.from_version() <= as_of);
        visible.checked_sub(1).and_then(|idx| rows.get(idx))
    }

    /// Resolve over an arbitrary, unsorted candidate set.
    ///
    /// O(n) scan.
    pub fn resolve<'a, R, I>(rows: I, as_of: StateVersion) -> Option<&'a R>
    where
        R: VersionedRow + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        rows.into_iter()
            .filter(|row| row.from_version() <= as_of)
            .max_by_key(|row| (row.from_version(), row.row_id()))
    }
}
