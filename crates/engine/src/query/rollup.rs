//! Offset slices of rollup snapshots
//!
//! Rollups are read whole and sliced in memory, so they page by offset
//! instead of by definition cursor.

use super::QueryExecutor;
use ledgerview_core::{EntityId, Error, OffsetCursor, Page, ResourceScope, Result, StateVersion, VaultScope};
use ledgerview_storage::AggregateIndex;
use std::fmt::Display;
use std::hash::Hash;
use tracing::warn;

fn rollup_slice<P, C>(
    index: &AggregateIndex<P, C>,
    parent: &P,
    as_of: StateVersion,
    cursor: Option<&str>,
    limit: usize,
) -> Result<Page<C>>
where
    P: Clone + Eq + Hash + Display,
    C: Clone,
{
    if limit == 0 {
        return Err(Error::invalid_input("rollup slice limit must be at least 1"));
    }
    let offset = match cursor {
        None => 0,
        Some(raw) => {
            OffsetCursor::decode(raw)
                .map_err(|e| {
                    warn!(cursor = raw, error = %e, "rejected offset cursor");
                    e
                })?
                .offset
        }
    };

    let children = index.get_children(parent, as_of);
    let total = children.len() as u64;
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(children.len());
    let end = start.saturating_add(limit).min(children.len());

    Ok(Page {
        items: children[start..end].to_vec(),
        next_cursor: OffsetCursor::next_after(offset, limit as u64, total)
            .map(|c| c.encode())
            .transpose()?,
        total_count: total,
    })
}

impl<'a> QueryExecutor<'a> {
    /// Slice of an entity's resources of one kind, most recently touched first.
    pub fn resource_rollup_slice(
        &self,
        scope: ResourceScope,
        as_of: StateVersion,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Page<EntityId>> {
        self.pin(as_of)?;
        rollup_slice(&self.state.resource_rollups, &scope, as_of, cursor, limit)
    }

    /// Slice of the vaults holding one resource of an entity, most recently
    /// touched first.
    pub fn vault_rollup_slice(
        &self,
        scope: VaultScope,
        as_of: StateVersion,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Page<EntityId>> {
        self.pin(as_of)?;
        rollup_slice(&self.state.vault_rollups, &scope, as_of, cursor, limit)
    }
}
