//! Cooperative cancellation for reads
//!
//! A [`CancelToken`] is cloned into every read. Long-running loops call
//! [`CancelToken::check`] between units of work and bail out with
//! [`Error::Cancelled`] once the caller has fired the token. Reads have no side
//! effects, so aborting at any check point leaves the store untouched.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that has not been cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for callers that never cancel
    pub fn never() -> Self {
        Self::default()
    }

    /// Fire the token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether the token has fired
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Return `Err(Error::Cancelled)` if the token has fired
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
