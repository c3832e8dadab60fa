//! Storage layer for LedgerView
//!
//! This crate implements the in-memory append-only backend with:
//! - VersionLog: committed ledger version with AtomicU64
//! - AttributeStore: Definition/History split with per-parent DashMap shards
//! - AggregateIndex: wholesale rollup snapshots
//! - TotalsTracker: per-parent counter series
//! - AsOfResolver / VersionChain: "latest row not newer than V" lookups
//!
//! # Concurrency
//!
//! One writer, many readers:
//! - Parent shards only lock the parent being written
//! - Arena locks are held for a single append or resolve
//! - Rows are never mutated after insertion, so a reader pinned to `V`
//!   sees a consistent snapshot

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod attribute;
pub mod chain;
pub mod resolver;
pub mod totals;
pub mod version_log;

pub use aggregate::{AggregateIndex, AggregateSnapshot};
pub use attribute::{
    AttributeStore, Definition, HistoryRow, PriorState, ResolvedEntry, WriteOutcome,
};
pub use chain::VersionChain;
pub use resolver::AsOfResolver;
pub use totals::{Totals, TotalsTracker};
pub use version_log::VersionLog;
