//! Core types and traits for LedgerView
//!
//! This crate defines the foundational types used throughout the system:
//! - StateVersion: the ledger clock every read is pinned to
//! - Cursor / OffsetCursor: opaque pagination positions
//! - Page: paginated response shape
//! - Surrogate ids and resource scopes
//! - CancelToken: cooperative read cancellation
//! - Error: Error type hierarchy
//! - Traits: storage abstraction (EntrySource, VersionedRow, EntryState)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod contract;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use cancel::CancelToken;
pub use contract::{Cursor, Direction, OffsetCursor, Page, StateVersion};
pub use error::{Error, Result};
pub use traits::{EntrySource, EntryState, VersionedRow};
pub use types::{
    Balance, DefinitionId, EntityId, ResourceKind, ResourceScope, RowId, VaultScope,
};
