//! Append-only attribute store with a Definition/History split
//!
//! A *definition* is the immutable identity of a `(parent, key)` pair. Its
//! *history* is the append-only stream of values (and tombstones) written for
//! it. Both live in surrogate-id arenas: definition `id` is stored at index
//! `id - 1` of the definition arena, and its history chain at the same index
//! of the history arena.
//!
//! # Design
//!
//! - DashMap: one shard per parent holding the key intern table and the
//!   ordered definition series used for cursor scans
//! - FxHashMap: O(1) `(parent, key) -> DefinitionId` lookups
//! - BTreeSet<Cursor>: definitions ordered by `(first_seen_version, id)`
//! - RwLock arenas: short read locks per resolve, one write lock per append
//!
//! # Lock order
//!
//! Writers take the parent shard, then `definitions`, then `histories`.
//! Readers never hold a parent shard while taking an arena lock.

use crate::chain::VersionChain;
use dashmap::DashMap;
use ledgerview_core::{
    Cursor, DefinitionId, Direction, EntrySource, EntryState, Error, Result, RowId, StateVersion,
    VersionedRow,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error};

/// Identity of a `(parent, key)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition<P, K> {
    /// Surrogate id
    pub id: DefinitionId,
    /// Owning parent
    pub parent: P,
    /// Attribute key
    pub key: K,
    /// Version the pair was first written at
    pub first_seen_version: StateVersion,
}

impl<P, K> Definition<P, K> {
    /// Position of this definition in its parent's series
    pub fn position(&self) -> Cursor {
        Cursor::new(self.first_seen_version, self.id.as_u64())
    }
}

/// One change to a definition. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow<V> {
    /// Row id, allocated in insertion order
    pub id: RowId,
    /// Definition this row belongs to
    pub definition_id: DefinitionId,
    /// Version the row is valid from
    pub from_version: StateVersion,
    /// Value, `None` for tombstones
    pub value: Option<V>,
    /// Whether the entry was locked against further changes
    pub is_locked: bool,
    /// Tombstone marker
    pub is_deleted: bool,
}

impl<V> VersionedRow for HistoryRow<V> {
    fn from_version(&self) -> StateVersion {
        self.from_version
    }

    fn row_id(&self) -> RowId {
        self.id
    }
}

/// A definition resolved as of a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry<K, V> {
    /// Surrogate id of the definition
    pub definition_id: DefinitionId,
    /// Attribute key
    pub key: K,
    /// Version the definition was created at
    pub first_seen_version: StateVersion,
    /// Current value, `None` when deleted
    pub value: Option<V>,
    /// Lock flag of the current row
    pub is_locked: bool,
    /// Whether the current row is a tombstone
    pub is_deleted: bool,
    /// `from_version` of the current row
    pub last_updated_version: StateVersion,
}

impl<K, V> ResolvedEntry<K, V> {
    /// Position of the entry's definition in its parent's series
    pub fn position(&self) -> Cursor {
        Cursor::new(self.first_seen_version, self.definition_id.as_u64())
    }
}

impl<K, V> EntryState for ResolvedEntry<K, V> {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

/// State of a definition immediately before a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorState {
    /// The `(parent, key)` pair had never been written
    Unseen,
    /// The latest row held a value
    Present,
    /// The latest row was a tombstone
    Deleted,
}

/// Result of an upsert or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Definition written to
    pub definition_id: DefinitionId,
    /// History row appended
    pub row_id: RowId,
    /// State before the write
    pub prior: PriorState,
}

impl WriteOutcome {
    /// Whether the write created the definition
    pub fn created(&self) -> bool {
        self.prior == PriorState::Unseen
    }
}

struct ParentShard<K> {
    by_key: FxHashMap<K, DefinitionId>,
    series: BTreeSet<Cursor>,
    last_version: StateVersion,
}

impl<K> Default for ParentShard<K> {
    fn default() -> Self {
        Self {
            by_key: FxHashMap::default(),
            series: BTreeSet::new(),
            last_version: StateVersion::ZERO,
        }
    }
}

#[inline]
fn slot(id: DefinitionId) -> Option<usize> {
    usize::try_from(id.as_u64()).ok()?.checked_sub(1)
}

/// Versioned key/attribute store for one kind of parent.
pub struct AttributeStore<P, K, V> {
    name: &'static str,
    parents: DashMap<P, ParentShard<K>>,
    definitions: RwLock<Vec<Definition<P, K>>>,
    histories: RwLock<Vec<VersionChain<HistoryRow<V>>>>,
    next_row_id: AtomicU64,
}

impl<P: Eq + Hash, K, V> fmt::Debug for AttributeStore<P, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("name", &self.name)
            .field("parents", &self.parents.len())
            .field("definitions", &self.definitions.read().len())
            .finish()
    }
}

impl<P, K, V> AttributeStore<P, K, V>
where
    P: Clone + Eq + Hash + Display,
    K: Clone + Eq + Hash + Debug,
    V: Clone,
{
    /// Create an empty store. `name` tags log lines and errors.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            parents: DashMap::new(),
            definitions: RwLock::new(Vec::new()),
            histories: RwLock::new(Vec::new()),
            next_row_id: AtomicU64::new(0),
        }
    }

    /// Store name
    pub fn name(&self) -> &'static str {
        self.name
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Write a value for `(parent, key)` at `at_version`.
    ///
    /// Creates the definition if the pair is unseen and always appends a
    /// history row, even when the value repeats.
    ///
    /// # Errors
    ///
    /// `NonMonotonicWrite` if `at_version` is below a version already written
    /// for `parent`.
    pub fn upsert(
        &self,
        parent: &P,
        key: K,
        value: V,
        at_version: StateVersion,
        locked: bool,
    ) -> Result<WriteOutcome> {
        self.append(parent, key, Some(value), at_version, locked)
    }

    /// Append a tombstone for `(parent, key)` at `at_version`.
    ///
    /// Deleting a never-seen key creates its definition with a tombstone as
    /// the first row.
    pub fn delete(&self, parent: &P, key: K, at_version: StateVersion) -> Result<WriteOutcome> {
        self.append(parent, key, None, at_version, false)
    }

    fn append(
        &self,
        parent: &P,
        key: K,
        value: Option<V>,
        at_version: StateVersion,
        locked: bool,
    ) -> Result<WriteOutcome> {
        let mut shard = self.parents.entry(parent.clone()).or_default();
        if at_version < shard.last_version {
            error!(
                store = self.name,
                parent = %parent,
                attempted = %at_version,
                committed = %shard.last_version,
                "non-monotonic attribute write"
            );
            return Err(Error::NonMonotonicWrite {
                target: format!("{}/{}", self.name, parent),
                attempted: at_version,
                committed: shard.last_version,
            });
        }

        let mut definitions = self.definitions.write();
        let mut histories = self.histories.write();

        let (definition_id, prior) = match shard.by_key.get(&key).copied() {
            Some(id) => {
                let latest = slot(id)
                    .and_then(|i| histories.get(i))
                    .and_then(|chain| chain.latest())
                    .ok_or_else(|| {
                        Error::inconsistency(format!(
                            "{}: {} has no history rows",
                            self.name, id
                        ))
                    })?;
                let prior = if latest.is_deleted {
                    PriorState::Deleted
                } else {
                    PriorState::Present
                };
                (id, prior)
            }
            None => {
                let id = DefinitionId::new(definitions.len() as u64 + 1);
                definitions.push(Definition {
                    id,
                    parent: parent.clone(),
                    key: key.clone(),
                    first_seen_version: at_version,
                });
                histories.push(VersionChain::new());
                shard.by_key.insert(key.clone(), id);
                shard
                    .series
                    .insert(Cursor::new(at_version, id.as_u64()));
                (id, PriorState::Unseen)
            }
        };

        let row_id = RowId::new(self.next_row_id.fetch_add(1, Ordering::AcqRel) + 1);
        let is_deleted = value.is_none();
        let chain = slot(definition_id)
            .and_then(|i| histories.get_mut(i))
            .ok_or_else(|| {
                Error::inconsistency(format!(
                    "{}: history series for {} is missing",
                    self.name, definition_id
                ))
            })?;
        chain
            .push(HistoryRow {
                id: row_id,
                definition_id,
                from_version: at_version,
                value,
                is_locked: locked,
                is_deleted,
            })
            .map_err(|committed| Error::NonMonotonicWrite {
                target: format!("{}/{}", self.name, definition_id),
                attempted: at_version,
                committed,
            })?;
        shard.last_version = at_version;

        debug!(
            store = self.name,
            parent = %parent,
            key = ?key,
            version = %at_version,
            definition_id = %definition_id,
            deleted = is_deleted,
            "appended history row"
        );

        Ok(WriteOutcome {
            definition_id,
            row_id,
            prior,
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Resolve `(parent, key)` as of `as_of`.
    ///
    /// `Ok(None)` when the pair was never written or was first written after
    /// `as_of`.
    pub fn get<Q>(
        &self,
        parent: &P,
        key: &Q,
        as_of: StateVersion,
    ) -> Result<Option<ResolvedEntry<K, V>>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.definition_id(parent, key) {
            Some(id) => self.resolve_definition(id, as_of),
            None => Ok(None),
        }
    }

    /// History rows of `(parent, key)` at or below `as_of`, newest first.
    pub fn history<Q>(
        &self,
        parent: &P,
        key: &Q,
        as_of: StateVersion,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryRow<V>>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.definition_id(parent, key) else {
            return Ok(Vec::new());
        };
        let histories = self.histories.read();
        let chain = slot(id).and_then(|i| histories.get(i)).ok_or_else(|| {
            Error::inconsistency(format!("{}: history series for {} is missing", self.name, id))
        })?;
        Ok(chain.history(as_of, limit).into_iter().cloned().collect())
    }

    /// Definition of `(parent, key)`, regardless of version
    pub fn definition<Q>(&self, parent: &P, key: &Q) -> Option<Definition<P, K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.definition_id(parent, key)?;
        let definitions = self.definitions.read();
        slot(id).and_then(|i| definitions.get(i)).cloned()
    }

    /// Number of definitions under `parent`, regardless of version
    pub fn definition_count(&self, parent: &P) -> usize {
        self.parents
            .get(parent)
            .map(|shard| shard.series.len())
            .unwrap_or(0)
    }

    /// Highest version written under `parent`
    pub fn last_write_version(&self, parent: &P) -> Option<StateVersion> {
        self.parents
            .get(parent)
            .filter(|shard| !shard.series.is_empty())
            .map(|shard| shard.last_version)
    }

    fn definition_id<Q>(&self, parent: &P, key: &Q) -> Option<DefinitionId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.parents
            .get(parent)
            .and_then(|shard| shard.by_key.get(key).copied())
    }

    fn resolve_definition(
        &self,
        id: DefinitionId,
        as_of: StateVersion,
    ) -> Result<Option<ResolvedEntry<K, V>>> {
        let definitions = self.definitions.read();
        let definition = slot(id).and_then(|i| definitions.get(i)).ok_or_else(|| {
            Error::inconsistency(format!("{}: {} does not exist", self.name, id))
        })?;
        if definition.first_seen_version > as_of {
            return Ok(None);
        }

        let histories = self.histories.read();
        let row = slot(id)
            .and_then(|i| histories.get(i))
            .and_then(|chain| chain.at(as_of))
            .ok_or_else(|| {
                Error::inconsistency(format!(
                    "{}: {} has no history row at or below version {}",
                    self.name, id, as_of
                ))
            })?;
        if row.definition_id != id {
            return Err(Error::inconsistency(format!(
                "{}: {} references {} but is filed under {}",
                self.name, row.id, row.definition_id, id
            )));
        }

        Ok(Some(ResolvedEntry {
            definition_id: id,
            key: definition.key.clone(),
            first_seen_version: definition.first_seen_version,
            value: row.value.clone(),
            is_locked: row.is_locked,
            is_deleted: row.is_deleted,
            last_updated_version: row.from_version,
        }))
    }
}

impl<P, K, V> EntrySource for AttributeStore<P, K, V>
where
    P: Clone + Eq + Hash + Display + Send + Sync,
    K: Clone + Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    type Parent = P;
    type Entry = ResolvedEntry<K, V>;

    fn scan_definitions(
        &self,
        parent: &P,
        start: Option<Cursor>,
        direction: Direction,
        as_of: StateVersion,
        limit: usize,
    ) -> Result<Vec<Cursor>> {
        if let Some(start) = start {
            start.ensure_within(as_of)?;
        }
        let Some(shard) = self.parents.get(parent) else {
            return Ok(Vec::new());
        };
        let ceiling = Cursor::ceiling(as_of);
        let positions = match direction {
            Direction::Descending => shard
                .series
                .range(..=start.unwrap_or(ceiling))
                .rev()
                .take(limit)
                .copied()
                .collect(),
            Direction::Ascending => shard
                .series
                .range(start.unwrap_or(Cursor::MIN)..=ceiling)
                .take(limit)
                .copied()
                .collect(),
        };
        Ok(positions)
    }

    fn resolve_at(&self, position: Cursor, as_of: StateVersion) -> Result<Option<Self::Entry>> {
        let resolved = self.resolve_definition(DefinitionId::new(position.id_boundary), as_of)?;
        match resolved {
            Some(entry) if entry.first_seen_version != position.version_boundary => {
                Err(Error::inconsistency(format!(
                    "{}: position {} does not match {} first seen at {}",
                    self.name, position, entry.definition_id, entry.first_seen_version
                )))
            }
            other => Ok(other),
        }
    }
}
