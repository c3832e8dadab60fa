//! Per-parent running counters
//!
//! Counts are their own append-only series so a page can report its total
//! without counting definitions. The tracker applies whatever deltas the
//! writer hands it; deciding what a write means for the counters is the
//! writer's job.

use crate::chain::VersionChain;
use dashmap::DashMap;
use ledgerview_core::{Error, Result, RowId, StateVersion, VersionedRow};
use serde::Serialize;
use std::fmt::{self, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error};

/// Entry counters of one parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Entries whose current row holds a value
    pub excluding_deleted: u64,
    /// Entries ever created, tombstoned or not
    pub including_deleted: u64,
}

impl Totals {
    /// Create a counter pair
    pub const fn new(excluding_deleted: u64, including_deleted: u64) -> Self {
        Totals {
            excluding_deleted,
            including_deleted,
        }
    }

    fn apply(self, delta_excluding: i64, delta_including: i64) -> Option<Totals> {
        Some(Totals {
            excluding_deleted: self.excluding_deleted.checked_add_signed(delta_excluding)?,
            including_deleted: self.including_deleted.checked_add_signed(delta_including)?,
        })
    }
}

#[derive(Debug, Clone)]
struct TotalsRow {
    id: RowId,
    from_version: StateVersion,
    totals: Totals,
}

impl VersionedRow for TotalsRow {
    fn from_version(&self) -> StateVersion {
        self.from_version
    }

    fn row_id(&self) -> RowId {
        self.id
    }
}

/// Versioned counter series keyed by parent.
pub struct TotalsTracker<P> {
    name: &'static str,
    series: DashMap<P, VersionChain<TotalsRow>>,
    next_row_id: AtomicU64,
}

impl<P: Eq + Hash> fmt::Debug for TotalsTracker<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TotalsTracker")
            .field("name", &self.name)
            .field("parents", &self.series.len())
            .finish()
    }
}

impl<P> TotalsTracker<P>
where
    P: Clone + Eq + Hash + Display,
{
    /// Create an empty tracker. `name` tags log lines and errors.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            series: DashMap::new(),
            next_row_id: AtomicU64::new(0),
        }
    }

    /// Apply signed deltas to the latest counters of `parent` and append the
    /// result at `at_version`.
    ///
    /// # Errors
    ///
    /// - `NonMonotonicWrite` if `at_version` is below the latest snapshot
    /// - `SchemaInconsistency` if a counter would drop below zero
    pub fn increment_totals(
        &self,
        parent: &P,
        at_version: StateVersion,
        delta_excluding: i64,
        delta_including: i64,
    ) -> Result<Totals> {
        let mut chain = self.series.entry(parent.clone()).or_default();
        let previous = chain.latest().map(|row| row.totals).unwrap_or_default();
        let totals = previous
            .apply(delta_excluding, delta_including)
            .ok_or_else(|| {
                error!(
                    tracker = self.name,
                    parent = %parent,
                    version = %at_version,
                    delta_excluding,
                    delta_including,
                    "totals delta out of range"
                );
                Error::inconsistency(format!(
                    "{}/{}: applying ({}, {}) to ({}, {}) leaves the counters out of range",
                    self.name,
                    parent,
                    delta_excluding,
                    delta_including,
                    previous.excluding_deleted,
                    previous.including_deleted
                ))
            })?;

        let id = RowId::new(self.next_row_id.fetch_add(1, Ordering::AcqRel) + 1);
        chain
            .push(TotalsRow {
                id,
                from_version: at_version,
                totals,
            })
            .map_err(|committed| {
                error!(
                    tracker = self.name,
                    parent = %parent,
                    attempted = %at_version,
                    committed = %committed,
                    "non-monotonic totals write"
                );
                Error::NonMonotonicWrite {
                    target: format!("{}/{}", self.name, parent),
                    attempted: at_version,
                    committed,
                }
            })?;

        debug!(
            tracker = self.name,
            parent = %parent,
            version = %at_version,
            excluding = totals.excluding_deleted,
            including = totals.including_deleted,
            "recorded totals"
        );
        Ok(totals)
    }

    /// Counters of `parent` as of `as_of`, `(0, 0)` when none were recorded
    pub fn get_totals(&self, parent: &P, as_of: StateVersion) -> Totals {
        self.series
            .get(parent)
            .and_then(|chain| chain.at(as_of).map(|row| row.totals))
            .unwrap_or_default()
    }
}
