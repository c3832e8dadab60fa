//! Ledger state version
//!
//! Every write is stamped with the state version that was active when the
//! ledger produced it. Every read is pinned to an explicit state version and
//! only observes writes stamped at or below it.
//!
//! ## Invariants
//!
//! - State versions are totally ordered
//! - The committed version only moves forward
//! - A write is never stamped below a previously committed write

use serde::{Deserialize, Serialize};

/// Ledger state version: the logical clock all reads are pinned to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVersion(u64);

impl StateVersion {
    /// The version before any ledger transaction was committed
    pub const ZERO: StateVersion = StateVersion(0);

    /// Highest representable version
    pub const MAX: StateVersion = StateVersion(u64::MAX);

    /// Create a state version
    pub const fn new(v: u64) -> Self {
        StateVersion(v)
    }

    /// Get the numeric value
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Check if this is the genesis version
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Next version (saturating)
    pub const fn next(&self) -> Self {
        StateVersion(self.0.saturating_add(1))
    }

    /// Previous version, `None` at zero
    pub const fn prev(&self) -> Option<Self> {
        match self.0.checked_sub(1) {
            Some(v) => Some(StateVersion(v)),
            None => None,
        }
    }
}

impl std::fmt::Display for StateVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StateVersion {
    fn from(v: u64) -> Self {
        StateVersion(v)
    }
}

impl From<StateVersion> for u64 {
    fn from(v: StateVersion) -> Self {
        v.0
    }
}
