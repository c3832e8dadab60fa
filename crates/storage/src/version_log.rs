//! Committed ledger state version
//!
//! The single writer applies every row of a ledger version, then commits the
//! version. Committed versions are sealed: no further rows may be stamped at
//! or below them. Readers check their pinned version against the log before
//! touching any store, so they only ever see fully applied versions.

use ledgerview_core::{Error, Result, StateVersion};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, warn};

/// Monotonic ledger clock.
#[derive(Debug, Default)]
pub struct VersionLog {
    committed: AtomicU64,
}

impl VersionLog {
    /// Create a log at version zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest committed version
    #[inline]
    pub fn current(&self) -> StateVersion {
        StateVersion::new(self.committed.load(Ordering::Acquire))
    }

    /// Check that a row stamped `version` may still be written.
    ///
    /// # Errors
    ///
    /// `NonMonotonicWrite` if `version` is already committed.
    pub fn check_write(&self, version: StateVersion) -> Result<()> {
        let committed = self.current();
        if version <= committed {
            error!(
                attempted = %version,
                committed = %committed,
                "write at or below committed ledger version"
            );
            return Err(Error::NonMonotonicWrite {
                target: "ledger".to_string(),
                attempted: version,
                committed,
            });
        }
        Ok(())
    }

    /// Commit every version up to and including `version`.
    ///
    /// Committing the current version again is a no-op.
    ///
    /// # Errors
    ///
    /// `NonMonotonicWrite` if `version` is below the committed version.
    pub fn advance_to(&self, version: StateVersion) -> Result<()> {
        let committed = self.current();
        if version < committed {
            error!(
                attempted = %version,
                committed = %committed,
                "commit below committed ledger version"
            );
            return Err(Error::NonMonotonicWrite {
                target: "ledger".to_string(),
                attempted: version,
                committed,
            });
        }
        self.committed.fetch_max(version.as_u64(), Ordering::AcqRel);
        Ok(())
    }

    /// Reject reads pinned above the committed version.
    pub fn ensure_readable(&self, version: StateVersion) -> Result<()> {
        let committed = self.current();
        if version > committed {
            warn!(
                requested = %version,
                committed = %committed,
                "read requested ahead of ledger tip"
            );
            return Err(Error::VersionAhead {
                requested: version,
                committed,
            });
        }
        Ok(())
    }
}
