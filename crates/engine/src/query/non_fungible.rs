//! Non-fungible ids of a resource
//!
//! Each id is a definition under its resource; burning tombstones it. The
//! page `total_count` is the supply (minted minus burned) as of the pinned
//! version.

use super::{decode_cursor, read_page, require_value, QueryExecutor};
use ledgerview_core::{CancelToken, EntityId, Error, Page, Result, StateVersion};
use ledgerview_storage::{ResolvedEntry, Totals};
use serde::Serialize;

/// One non-burned non-fungible id with its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonFungibleIdItem {
    /// Non-fungible id
    pub non_fungible_id: String,
    /// Raw encoded data
    pub data: Vec<u8>,
    /// Whether the data is locked
    pub is_locked: bool,
    /// Version of the latest data change
    pub last_updated_version: StateVersion,
}

impl NonFungibleIdItem {
    fn from_entry(entry: ResolvedEntry<String, Vec<u8>>) -> Result<Self> {
        let data = require_value(entry.value, format_args!("non-fungible {}", entry.definition_id))?;
        Ok(NonFungibleIdItem {
            non_fungible_id: entry.key,
            data,
            is_locked: entry.is_locked,
            last_updated_version: entry.last_updated_version,
        })
    }
}

impl<'a> QueryExecutor<'a> {
    /// Data of one non-fungible id.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id was not minted yet or was burned as of `as_of`.
    pub fn non_fungible_data(
        &self,
        resource: EntityId,
        id: &str,
        as_of: StateVersion,
    ) -> Result<NonFungibleIdItem> {
        self.pin(as_of)?;
        match self.state.non_fungibles.get(&resource, id, as_of)? {
            Some(entry) if !entry.is_deleted => NonFungibleIdItem::from_entry(entry),
            _ => Err(Error::not_found(format!(
                "non-fungible '{}' of {} at version {}",
                id, resource, as_of
            ))),
        }
    }

    /// Supply (`excluding_deleted`) and minted (`including_deleted`) counts
    /// of `resource`.
    pub fn non_fungible_totals(&self, resource: EntityId, as_of: StateVersion) -> Result<Totals> {
        self.pin(as_of)?;
        Ok(self.state.non_fungible_totals.get_totals(&resource, as_of))
    }

    /// One page of the non-burned ids of `resource`.
    pub fn non_fungible_ids_page(
        &self,
        resource: EntityId,
        as_of: StateVersion,
        cursor: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Page<NonFungibleIdItem>> {
        self.pin(as_of)?;
        let start = decode_cursor(cursor, as_of)?;
        let supply = self
            .state
            .non_fungible_totals
            .get_totals(&resource, as_of)
            .excluding_deleted;
        read_page(
            &self.state.non_fungibles,
            &self.config.non_fungible_ids,
            &resource,
            as_of,
            start,
            cancel,
            supply,
            NonFungibleIdItem::from_entry,
        )
    }
}
