//! Core traits for storage abstraction
//!
//! These traits let the paginator and query layer run over any backend that
//! can produce an ordered definition series and resolve a definition as of a
//! version. The shipped backend is the in-memory `AttributeStore`.

use crate::contract::{Cursor, Direction, StateVersion};
use crate::error::Result;
use crate::types::RowId;

/// A row in an append-only, version-stamped series.
///
/// Rows of one series are ordered by `(from_version, row_id)`. The row that is
/// current as of `V` is the greatest row with `from_version <= V`.
pub trait VersionedRow {
    /// Version this row became valid
    fn from_version(&self) -> StateVersion;

    /// Insertion-ordered row id, breaks ties on `from_version`
    fn row_id(&self) -> RowId;
}

/// Resolved state of one definition as of a version.
pub trait EntryState {
    /// Whether the resolved row is a tombstone
    fn is_deleted(&self) -> bool;
}

/// Repository over a definition series with per-definition history.
///
/// Positions are [`Cursor`]s: `version_boundary` is the definition's
/// `first_seen_version`, `id_boundary` its surrogate id.
///
/// Thread safety: implementations are read concurrently with the single
/// writer (requires Send + Sync).
pub trait EntrySource: Send + Sync {
    /// Parent key the definition series belongs to
    type Parent;

    /// Resolved entry handed to callers
    type Entry: EntryState;

    /// Scan definition positions of `parent` in `direction`.
    ///
    /// Starts at `start` (inclusive) or at the series edge when `None`, skips
    /// definitions first seen after `as_of`, and returns at most `limit`
    /// positions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCursor` if `start` lies above `as_of`, or an error if
    /// the storage operation fails.
    fn scan_definitions(
        &self,
        parent: &Self::Parent,
        start: Option<Cursor>,
        direction: Direction,
        as_of: StateVersion,
        limit: usize,
    ) -> Result<Vec<Cursor>>;

    /// Resolve the definition at `position` as of `as_of`.
    ///
    /// Returns `None` if the definition was first seen after `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaInconsistency` if the position names a definition the
    /// store does not hold, or one with no history row at or below `as_of`.
    fn resolve_at(&self, position: Cursor, as_of: StateVersion) -> Result<Option<Self::Entry>>;
}
