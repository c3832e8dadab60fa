//! Ledger engine for LedgerView
//!
//! This crate wires the storage layer into a ledger:
//! - LedgerView: open, hand out the writer, run reads
//! - LedgerWriter: ordered writes, derived totals and rollups, commit
//! - CursorPaginator: version-stable cursor pagination over any entry source
//! - QueryExecutor: as-of reads (metadata, key-value stores, resources, vaults,
//!   non-fungible ids)
//!
//! The engine is the only component that knows about:
//! - Which stores make up a ledger
//! - How totals and rollups are derived from attribute writes
//! - The per-level pagination knobs

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ledger;
pub mod paginator;
pub mod query;
pub mod state;
pub mod writer;

pub use ledger::{LedgerView, LedgerViewConfig, PaginationConfig, CONFIG_FILE_NAME};
pub use paginator::{CursorPaginator, Window, WindowOutcome};
pub use query::{
    EntityResources, KeyValueItem, MetadataItem, NonFungibleIdItem, QueryExecutor, ResourceItem,
    ResourcesRequest, VaultItem,
};
pub use state::LedgerState;
pub use writer::{totals_delta, LedgerWriter};
