//! LedgerView - point-in-time indexed ledger state
//!
//! LedgerView keeps every version of an entity's metadata, key-value store
//! entries, resource balances, vault balances and non-fungible data, and
//! answers reads pinned to any committed state version. Paginated reads hand
//! out cursors that stay valid while new versions are committed.
//!
//! # Quick Start
//!
//! ```
//! use ledgerview::{CancelToken, EntityId, LedgerView, LedgerViewConfig, StateVersion};
//!
//! let ledger = LedgerView::open(LedgerViewConfig::default())?;
//! let writer = ledger.writer()?;
//!
//! let v1 = StateVersion::new(1);
//! writer.upsert_metadata(EntityId::new(7), "name", b"Radix".to_vec(), false, v1)?;
//! writer.commit(v1)?;
//!
//! let item = ledger.query().metadata_value(EntityId::new(7), "name", v1)?;
//! assert_eq!(item.value, b"Radix");
//!
//! let page = ledger
//!     .query()
//!     .metadata_page(EntityId::new(7), v1, None, &CancelToken::never())?;
//! assert_eq!(page.total_count, 1);
//! # Ok::<(), ledgerview::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `ledgerview-core`: versions, cursors, pages, ids, errors, storage traits
//! - `ledgerview-storage`: append-only attribute stores, rollups, totals
//! - `ledgerview-engine`: writer, paginator, as-of queries, configuration

pub use ledgerview_core::{
    Balance, CancelToken, Cursor, DefinitionId, Direction, EntityId, Error, OffsetCursor, Page,
    ResourceKind, ResourceScope, Result, RowId, StateVersion, VaultScope,
};
pub use ledgerview_engine::{
    EntityResources, KeyValueItem, LedgerView, LedgerViewConfig, LedgerWriter, MetadataItem,
    NonFungibleIdItem, PaginationConfig, QueryExecutor, ResourceItem, ResourcesRequest, VaultItem,
    CONFIG_FILE_NAME,
};
pub use ledgerview_storage::{HistoryRow, PriorState, ResolvedEntry, Totals, WriteOutcome};
