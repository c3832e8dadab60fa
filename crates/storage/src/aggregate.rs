//! Wholesale per-parent rollup snapshots
//!
//! Each snapshot holds the *entire* child set of a parent valid from its
//! version. Reads resolve one snapshot and hand out a shared slice, so
//! "children of X as of V" costs one binary search regardless of how many
//! snapshots the parent has accumulated.

use crate::chain::VersionChain;
use dashmap::DashMap;
use ledgerview_core::{Error, Result, RowId, StateVersion, VersionedRow};
use std::fmt::{self, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Full child set of a parent, valid from `from_version`.
#[derive(Debug, Clone)]
pub struct AggregateSnapshot<C> {
    /// Row id
    pub id: RowId,
    /// Version the snapshot is valid from
    pub from_version: StateVersion,
    /// Complete child set, in rollup order
    pub children: Arc<[C]>,
}

impl<C> VersionedRow for AggregateSnapshot<C> {
    fn from_version(&self) -> StateVersion {
        self.from_version
    }

    fn row_id(&self) -> RowId {
        self.id
    }
}

/// Rollup index from parent to its ordered child set.
pub struct AggregateIndex<P, C> {
    name: &'static str,
    snapshots: DashMap<P, VersionChain<AggregateSnapshot<C>>>,
    next_row_id: AtomicU64,
}

impl<P: Eq + Hash, C> fmt::Debug for AggregateIndex<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateIndex")
            .field("name", &self.name)
            .field("parents", &self.snapshots.len())
            .finish()
    }
}

impl<P, C> AggregateIndex<P, C>
where
    P: Clone + Eq + Hash + Display,
{
    /// Create an empty index. `name` tags log lines and errors.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            snapshots: DashMap::new(),
            next_row_id: AtomicU64::new(0),
        }
    }

    /// Replace the child set of `parent` from `at_version` on.
    ///
    /// `children` must be the complete set, not a delta.
    ///
    /// # Errors
    ///
    /// `NonMonotonicWrite` if `at_version` is below the parent's latest snapshot.
    pub fn set_children(
        &self,
        parent: &P,
        children: impl Into<Arc<[C]>>,
        at_version: StateVersion,
    ) -> Result<RowId> {
        let children = children.into();
        let mut chain = self.snapshots.entry(parent.clone()).or_default();
        let id = RowId::new(self.next_row_id.fetch_add(1, Ordering::AcqRel) + 1);
        let count = children.len();
        chain
            .push(AggregateSnapshot {
                id,
                from_version: at_version,
                children,
            })
            .map_err(|committed| {
                error!(
                    index = self.name,
                    parent = %parent,
                    attempted = %at_version,
                    committed = %committed,
                    "non-monotonic rollup write"
                );
                Error::NonMonotonicWrite {
                    target: format!("{}/{}", self.name, parent),
                    attempted: at_version,
                    committed,
                }
            })?;

        debug!(
            index = self.name,
            parent = %parent,
            version = %at_version,
            children = count,
            "wrote rollup snapshot"
        );
        Ok(id)
    }

    /// Child set of `parent` as of `as_of`, empty when no snapshot applies
    pub fn get_children(&self, parent: &P, as_of: StateVersion) -> Arc<[C]> {
        self.snapshots
            .get(parent)
            .and_then(|chain| chain.at(as_of).map(|s| Arc::clone(&s.children)))
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    /// Newest child set of `parent`, empty when none was written
    pub fn latest_children(&self, parent: &P) -> Arc<[C]> {
        self.snapshots
            .get(parent)
            .and_then(|chain| chain.latest().map(|s| Arc::clone(&s.children)))
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    /// Number of snapshots stored for `parent`
    pub fn snapshot_count(&self, parent: &P) -> usize {
        self.snapshots
            .get(parent)
            .map(|chain| chain.len())
            .unwrap_or(0)
    }
}
