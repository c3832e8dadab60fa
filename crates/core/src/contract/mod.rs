//! Contract types for API stability
//!
//! These types define what every read and write exchanges with callers:
//!
//! 1. **Versioned**: every write is stamped with a `StateVersion`, every read is pinned to one
//! 2. **Resumable**: every paginated read hands out a `Cursor` or `OffsetCursor`
//! 3. **Counted**: every page carries a `total_count` read from a totals series
//!
//! ## Module Structure
//!
//! - `version`: Ledger state version
//! - `cursor`: Composite and offset cursors, traversal direction
//! - `page`: Page response shape

pub mod cursor;
pub mod page;
pub mod version;

// Re-exports
pub use cursor::{Cursor, Direction, OffsetCursor};
pub use page::Page;
pub use version::StateVersion;
