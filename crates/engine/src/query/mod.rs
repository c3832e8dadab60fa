//! As-of reads
//!
//! A [`QueryExecutor`] answers every read against one shared
//! [`LedgerState`]. All reads are pinned to an explicit version, which must
//! not be above the committed tip. Paginated reads run one
//! [`CursorPaginator`] per level with that level's configured knobs and take
//! their `total_count` from the level's totals series.
//!
//! | Module | Reads |
//! |--------|-------|
//! | `metadata` | entity metadata entries, single and multi-entity pages, history |
//! | `key_value` | key-value store entries and key pages |
//! | `resources` | entity → resource → vault fan-out, vault pages |
//! | `non_fungible` | non-fungible id pages, id data, supply |
//! | `rollup` | offset slices of rollup snapshots |

pub mod key_value;
pub mod metadata;
pub mod non_fungible;
pub mod resources;
pub mod rollup;

pub use key_value::KeyValueItem;
pub use metadata::MetadataItem;
pub use non_fungible::NonFungibleIdItem;
pub use resources::{EntityResources, ResourceItem, ResourcesRequest, VaultItem};

use crate::ledger::{LedgerViewConfig, PaginationConfig};
use crate::paginator::CursorPaginator;
use crate::state::LedgerState;
use ledgerview_core::{
    CancelToken, Cursor, EntrySource, Error, Page, Result, StateVersion,
};
use std::fmt::Display;
use tracing::{debug, warn};

/// Read-only view over the shared stores.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor<'a> {
    state: &'a LedgerState,
    config: &'a LedgerViewConfig,
}

impl<'a> QueryExecutor<'a> {
    pub(crate) fn new(state: &'a LedgerState, config: &'a LedgerViewConfig) -> Self {
        Self { state, config }
    }

    /// Configuration the executor pages with
    pub fn config(&self) -> &LedgerViewConfig {
        self.config
    }

    fn pin(&self, as_of: StateVersion) -> Result<()> {
        self.state.versions.ensure_readable(as_of)
    }
}

/// Decode an optional client cursor for a read pinned at `as_of`.
fn decode_cursor(raw: Option<&str>, as_of: StateVersion) -> Result<Option<Cursor>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    Cursor::decode(raw)
        .and_then(|cursor| cursor.ensure_within(as_of).map(|()| Some(cursor)))
        .map_err(|e| {
            warn!(cursor = raw, version = %as_of, error = %e, "rejected cursor");
            e
        })
}

/// Value of a visible entry; a visible entry without one is a broken store.
fn require_value<V>(value: Option<V>, what: impl Display) -> Result<V> {
    value.ok_or_else(|| Error::inconsistency(format!("{} is visible but has no value", what)))
}

/// Run one paginated level and shape it into a [`Page`].
#[allow(clippy::too_many_arguments)]
fn read_page<S, T, F>(
    source: &S,
    config: &PaginationConfig,
    parent: &S::Parent,
    as_of: StateVersion,
    start: Option<Cursor>,
    cancel: &CancelToken,
    total_count: u64,
    map: F,
) -> Result<Page<T>>
where
    S: EntrySource,
    S::Parent: Display,
    F: FnMut(S::Entry) -> Result<T>,
{
    let window = CursorPaginator::new(source, config)?.fetch(parent, as_of, start, cancel)?;
    let next_cursor = window.next_cursor().map(|c| c.encode()).transpose()?;
    debug!(
        parent = %parent,
        version = %as_of,
        items = window.items.len(),
        scanned = window.scanned,
        outcome = ?window.outcome,
        "read page"
    );
    let items = window
        .items
        .into_iter()
        .map(map)
        .collect::<Result<Vec<T>>>()?;
    Ok(Page {
        items,
        next_cursor,
        total_count,
    })
}
