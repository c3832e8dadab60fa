//! Key-value store reads

use super::{decode_cursor, read_page, require_value, QueryExecutor};
use ledgerview_core::{CancelToken, EntityId, Page, Result, StateVersion};
use ledgerview_storage::{HistoryRow, ResolvedEntry};
use serde::Serialize;

/// One visible key-value store entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValueItem {
    /// Raw encoded key
    pub key: Vec<u8>,
    /// Raw encoded value
    pub value: Vec<u8>,
    /// Whether the entry is locked
    pub is_locked: bool,
    /// Version of the latest change
    pub last_updated_version: StateVersion,
}

impl KeyValueItem {
    fn from_entry(entry: ResolvedEntry<Vec<u8>, Vec<u8>>) -> Result<Self> {
        let value = require_value(entry.value, format_args!("kv entry {}", entry.definition_id))?;
        Ok(KeyValueItem {
            key: entry.key,
            value,
            is_locked: entry.is_locked,
            last_updated_version: entry.last_updated_version,
        })
    }
}

impl<'a> QueryExecutor<'a> {
    /// Resolve one key-value store entry as of `as_of`, tombstones included.
    pub fn kv_entry(
        &self,
        store: EntityId,
        key: &[u8],
        as_of: StateVersion,
    ) -> Result<Option<ResolvedEntry<Vec<u8>, Vec<u8>>>> {
        self.pin(as_of)?;
        self.state.kv_entries.get(&store, key, as_of)
    }

    /// Changes to one key-value store entry at or below `as_of`, newest first.
    pub fn kv_history(
        &self,
        store: EntityId,
        key: &[u8],
        as_of: StateVersion,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryRow<Vec<u8>>>> {
        self.pin(as_of)?;
        self.state.kv_entries.history(&store, key, as_of, limit)
    }

    /// One page of the visible entries of key-value store `store`.
    pub fn kv_keys_page(
        &self,
        store: EntityId,
        as_of: StateVersion,
        cursor: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Page<KeyValueItem>> {
        self.pin(as_of)?;
        let start = decode_cursor(cursor, as_of)?;
        let total = self.state.kv_totals.get_totals(&store, as_of).excluding_deleted;
        read_page(
            &self.state.kv_entries,
            &self.config.key_value_store,
            &store,
            as_of,
            start,
            cancel,
            total,
            KeyValueItem::from_entry,
        )
    }
}
