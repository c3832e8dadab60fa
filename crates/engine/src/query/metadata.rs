//! Entity metadata reads

use super::{decode_cursor, read_page, require_value, QueryExecutor};
use crate::ledger::PaginationConfig;
use ledgerview_core::{CancelToken, Cursor, EntityId, Error, Page, Result, StateVersion};
use ledgerview_storage::{HistoryRow, ResolvedEntry};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// One visible metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataItem {
    /// Entry name
    pub key: String,
    /// Raw encoded value
    pub value: Vec<u8>,
    /// Whether the entry is locked
    pub is_locked: bool,
    /// Version of the latest change
    pub last_updated_version: StateVersion,
}

impl MetadataItem {
    fn from_entry(entry: ResolvedEntry<String, Vec<u8>>) -> Result<Self> {
        let value = require_value(entry.value, format_args!("metadata {}", entry.definition_id))?;
        Ok(MetadataItem {
            key: entry.key,
            value,
            is_locked: entry.is_locked,
            last_updated_version: entry.last_updated_version,
        })
    }
}

impl<'a> QueryExecutor<'a> {
    /// Resolve one metadata entry as of `as_of`, tombstones included.
    ///
    /// `Ok(None)` if the entry did not exist yet.
    pub fn metadata_entry(
        &self,
        entity: EntityId,
        key: &str,
        as_of: StateVersion,
    ) -> Result<Option<ResolvedEntry<String, Vec<u8>>>> {
        self.pin(as_of)?;
        self.state.metadata.get(&entity, key, as_of)
    }

    /// Visible value of one metadata entry.
    ///
    /// # Errors
    ///
    /// `NotFound` if the entry did not exist or was deleted as of `as_of`.
    pub fn metadata_value(&self, entity: EntityId, key: &str, as_of: StateVersion) -> Result<MetadataItem> {
        match self.metadata_entry(entity, key, as_of)? {
            Some(entry) if !entry.is_deleted => MetadataItem::from_entry(entry),
            _ => Err(Error::not_found(format!(
                "metadata '{}' of {} at version {}",
                key, entity, as_of
            ))),
        }
    }

    /// Changes to one metadata entry at or below `as_of`, newest first.
    pub fn metadata_history(
        &self,
        entity: EntityId,
        key: &str,
        as_of: StateVersion,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryRow<Vec<u8>>>> {
        self.pin(as_of)?;
        self.state.metadata.history(&entity, key, as_of, limit)
    }

    /// One page of `entity`'s visible metadata.
    pub fn metadata_page(
        &self,
        entity: EntityId,
        as_of: StateVersion,
        cursor: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Page<MetadataItem>> {
        self.pin(as_of)?;
        let start = decode_cursor(cursor, as_of)?;
        self.metadata_level(entity, as_of, start, &self.config.metadata, cancel)
    }

    /// First metadata page of each of `entities`, in request order.
    ///
    /// The request's definition budget is split evenly across the distinct
    /// entities. A cursor can only be combined with a single entity.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a cursor is given with more than one entity, or if
    /// the budget cannot give every entity more definitions than a page holds.
    pub fn metadata_pages(
        &self,
        entities: &[EntityId],
        as_of: StateVersion,
        cursor: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Vec<(EntityId, Page<MetadataItem>)>> {
        self.pin(as_of)?;
        let mut seen = FxHashSet::default();
        let distinct: Vec<EntityId> = entities.iter().copied().filter(|e| seen.insert(*e)).collect();
        if cursor.is_some() && distinct.len() > 1 {
            return Err(Error::invalid_input(
                "a cursor can only be used when reading a single entity",
            ));
        }
        let start = decode_cursor(cursor, as_of)?;
        let section = self.split_metadata_budget(distinct.len())?;

        distinct
            .into_iter()
            .map(|entity| {
                cancel.check()?;
                let page = self.metadata_level(entity, as_of, start, &section, cancel)?;
                Ok((entity, page))
            })
            .collect()
    }

    /// Per-entity metadata knobs when `entity_count` entities share one request.
    ///
    /// The summed lookahead never exceeds `max_definitions_per_request`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if an even share is not above the page size.
    pub fn split_metadata_budget(&self, entity_count: usize) -> Result<PaginationConfig> {
        let section = self.config.metadata;
        let share = self.config.max_definitions_per_request / entity_count.max(1);
        if share <= section.page_size {
            return Err(Error::invalid_input(format!(
                "{} entities exceed the definition budget of {} at page size {}",
                entity_count, self.config.max_definitions_per_request, section.page_size
            )));
        }
        Ok(section.with_lookahead(share.min(section.definition_lookahead_limit)))
    }

    fn metadata_level(
        &self,
        entity: EntityId,
        as_of: StateVersion,
        start: Option<Cursor>,
        section: &PaginationConfig,
        cancel: &CancelToken,
    ) -> Result<Page<MetadataItem>> {
        let total = self
            .state
            .metadata_totals
            .get_totals(&entity, as_of)
            .excluding_deleted;
        read_page(
            &self.state.metadata,
            section,
            &entity,
            as_of,
            start,
            cancel,
            total,
            MetadataItem::from_entry,
        )
    }
}
