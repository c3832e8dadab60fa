//! Single ledger writer
//!
//! The ingestion pipeline decodes transactions and calls into the writer
//! once per changed substate, then commits the version. The writer keeps
//! the derived series in step with every attribute write:
//!
//! - totals deltas are derived from the entry's state before the write
//! - rollups are kept most-recently-touched first, rewritten only when the
//!   order changes
//!
//! A fatal error (non-monotonic write, broken store invariant) halts the
//! writer: every later write and commit is refused, so a partially applied
//! version never becomes readable.

use crate::state::LedgerState;
use ledgerview_core::{
    Balance, EntityId, Error, ResourceKind, ResourceScope, Result, StateVersion, VaultScope,
};
use ledgerview_storage::{AggregateIndex, PriorState, TotalsTracker, WriteOutcome};
use std::fmt::Display;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Totals deltas `(excluding_deleted, including_deleted)` for a write that
/// leaves an entry deleted or not, given its state before the write.
pub fn totals_delta(prior: PriorState, deleted: bool) -> (i64, i64) {
    match (prior, deleted) {
        (PriorState::Unseen, false) => (1, 1),
        (PriorState::Unseen, true) => (0, 1),
        (PriorState::Present, true) => (-1, 0),
        (PriorState::Deleted, false) => (1, 0),
        (PriorState::Present, false) | (PriorState::Deleted, true) => (0, 0),
    }
}

fn record_totals<P>(
    tracker: &TotalsTracker<P>,
    parent: &P,
    at: StateVersion,
    prior: PriorState,
    deleted: bool,
) -> Result<()>
where
    P: Clone + Eq + Hash + Display,
{
    let (excluding, including) = totals_delta(prior, deleted);
    if excluding != 0 || including != 0 {
        tracker.increment_totals(parent, at, excluding, including)?;
    }
    Ok(())
}

/// Move `child` to the front of the parent's rollup.
fn touch_rollup<P, C>(index: &AggregateIndex<P, C>, parent: &P, child: C, at: StateVersion) -> Result<()>
where
    P: Clone + Eq + Hash + Display,
    C: Clone + PartialEq,
{
    let current = index.latest_children(parent);
    if current.first() == Some(&child) {
        return Ok(());
    }
    let mut reordered = Vec::with_capacity(current.len() + 1);
    reordered.push(child.clone());
    reordered.extend(current.iter().filter(|c| **c != child).cloned());
    index.set_children(parent, reordered, at)?;
    Ok(())
}

/// Append-only writer over a [`LedgerState`].
#[derive(Debug)]
pub struct LedgerWriter {
    state: Arc<LedgerState>,
    halted: AtomicBool,
}

impl LedgerWriter {
    pub(crate) fn new(state: Arc<LedgerState>) -> Self {
        Self {
            state,
            halted: AtomicBool::new(false),
        }
    }

    /// Whether a fatal error has stopped the writer
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    fn apply<T>(&self, at: StateVersion, f: impl FnOnce(&LedgerState) -> Result<T>) -> Result<T> {
        if self.is_halted() {
            return Err(Error::inconsistency(
                "ledger writer halted after a fatal error",
            ));
        }
        let result = self
            .state
            .versions
            .check_write(at)
            .and_then(|()| f(&self.state));
        if let Err(e) = &result {
            if e.is_fatal() {
                error!(version = %at, error = %e, "halting ledger writer");
                self.halted.store(true, Ordering::Release);
            }
        }
        result
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Write a metadata entry of `entity`
    pub fn upsert_metadata(
        &self,
        entity: EntityId,
        key: impl Into<String>,
        value: Vec<u8>,
        locked: bool,
        at: StateVersion,
    ) -> Result<WriteOutcome> {
        self.apply(at, |state| {
            let outcome = state.metadata.upsert(&entity, key.into(), value, at, locked)?;
            record_totals(&state.metadata_totals, &entity, at, outcome.prior, false)?;
            Ok(outcome)
        })
    }

    /// Tombstone a metadata entry of `entity`
    pub fn delete_metadata(
        &self,
        entity: EntityId,
        key: impl Into<String>,
        at: StateVersion,
    ) -> Result<WriteOutcome> {
        self.apply(at, |state| {
            let outcome = state.metadata.delete(&entity, key.into(), at)?;
            record_totals(&state.metadata_totals, &entity, at, outcome.prior, true)?;
            Ok(outcome)
        })
    }

    // ========================================================================
    // Key-value stores
    // ========================================================================

    /// Write an entry of key-value store `store`
    pub fn upsert_kv_entry(
        &self,
        store: EntityId,
        key: Vec<u8>,
        value: Vec<u8>,
        locked: bool,
        at: StateVersion,
    ) -> Result<WriteOutcome> {
        self.apply(at, |state| {
            let outcome = state.kv_entries.upsert(&store, key, value, at, locked)?;
            record_totals(&state.kv_totals, &store, at, outcome.prior, false)?;
            Ok(outcome)
        })
    }

    /// Tombstone an entry of key-value store `store`
    pub fn delete_kv_entry(&self, store: EntityId, key: Vec<u8>, at: StateVersion) -> Result<WriteOutcome> {
        self.apply(at, |state| {
            let outcome = state.kv_entries.delete(&store, key, at)?;
            record_totals(&state.kv_totals, &store, at, outcome.prior, true)?;
            Ok(outcome)
        })
    }

    // ========================================================================
    // Resources and vaults
    // ========================================================================

    /// Record `entity`'s aggregated balance of `resource`
    pub fn set_resource_balance(
        &self,
        entity: EntityId,
        resource: EntityId,
        kind: ResourceKind,
        balance: Balance,
        at: StateVersion,
    ) -> Result<WriteOutcome> {
        self.apply(at, |state| {
            let scope = ResourceScope::new(entity, kind);
            let outcome = state.resources.upsert(&scope, resource, balance, at, false)?;
            record_totals(&state.resource_totals, &scope, at, outcome.prior, false)?;
            touch_rollup(&state.resource_rollups, &scope, resource, at)?;
            Ok(outcome)
        })
    }

    /// Record the balance of one of `entity`'s vaults holding `resource`
    pub fn set_vault_balance(
        &self,
        entity: EntityId,
        resource: EntityId,
        vault: EntityId,
        balance: Balance,
        at: StateVersion,
    ) -> Result<WriteOutcome> {
        self.apply(at, |state| {
            let scope = VaultScope::new(entity, resource);
            let outcome = state.vaults.upsert(&scope, vault, balance, at, false)?;
            record_totals(&state.vault_totals, &scope, at, outcome.prior, false)?;
            touch_rollup(&state.vault_rollups, &scope, vault, at)?;
            Ok(outcome)
        })
    }

    // ========================================================================
    // Non-fungible ids
    // ========================================================================

    /// Record the data of non-fungible `id` of `resource`; the first write
    /// mints it.
    pub fn upsert_non_fungible(
        &self,
        resource: EntityId,
        id: impl Into<String>,
        data: Vec<u8>,
        locked: bool,
        at: StateVersion,
    ) -> Result<WriteOutcome> {
        self.apply(at, |state| {
            let outcome = state.non_fungibles.upsert(&resource, id.into(), data, at, locked)?;
            record_totals(&state.non_fungible_totals, &resource, at, outcome.prior, false)?;
            Ok(outcome)
        })
    }

    /// Burn non-fungible `id` of `resource`
    pub fn burn_non_fungible(
        &self,
        resource: EntityId,
        id: impl Into<String>,
        at: StateVersion,
    ) -> Result<WriteOutcome> {
        self.apply(at, |state| {
            let outcome = state.non_fungibles.delete(&resource, id.into(), at)?;
            record_totals(&state.non_fungible_totals, &resource, at, outcome.prior, true)?;
            Ok(outcome)
        })
    }

    // ========================================================================
    // Commit
    // ========================================================================

    /// Make every write stamped at or below `version` readable.
    ///
    /// # Errors
    ///
    /// Refused once the writer has halted; `NonMonotonicWrite` if `version`
    /// is below the committed tip.
    pub fn commit(&self, version: StateVersion) -> Result<()> {
        if self.is_halted() {
            return Err(Error::inconsistency(
                "ledger writer halted after a fatal error",
            ));
        }
        if let Err(e) = self.state.versions.advance_to(version) {
            self.halted.store(true, Ordering::Release);
            return Err(e);
        }
        debug!(version = %version, "committed ledger version");
        Ok(())
    }
}

impl Drop for LedgerWriter {
    fn drop(&mut self) {
        info!(
            committed = %self.state.versions.current(),
            halted = self.is_halted(),
            "ledger writer released"
        );
    }
}
