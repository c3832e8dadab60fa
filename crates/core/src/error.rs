//! Error types for LedgerView
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! # Categories
//!
//! | Category | Variants | Handling |
//! |----------|----------|----------|
//! | Expected miss | `NotFound` | Surface as an absent result |
//! | Client input | `InvalidCursor`, `InvalidInput`, `VersionAhead` | Reject the request |
//! | Writer fatal | `NonMonotonicWrite`, `SchemaInconsistency` | Halt ingestion |
//! | Lifecycle | `Cancelled` | Abort the read, no side effects |
//! | System | `Io`, `Serialization`, `InvalidConfig` | Startup / infrastructure |

use crate::contract::StateVersion;
use std::io;
use thiserror::Error;

/// Result type alias for LedgerView operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for LedgerView
#[derive(Debug, Error)]
pub enum Error {
    /// The requested entry, parent or definition does not exist at the requested version
    #[error("not found: {0}")]
    NotFound(String),

    /// A write-path invariant was violated (store corruption or ingestion bug)
    #[error("schema inconsistency: {0}")]
    SchemaInconsistency(String),

    /// Malformed cursor string
    #[error("invalid cursor: {reason}")]
    InvalidCursor {
        /// Why the cursor was rejected
        reason: String,
    },

    /// A write arrived with a version below one already committed for its target
    #[error("non-monotonic write to {target}: version {attempted} is below committed version {committed}")]
    NonMonotonicWrite {
        /// Store and parent the write was addressed to
        target: String,
        /// Version carried by the rejected write
        attempted: StateVersion,
        /// Highest version already committed for the target
        committed: StateVersion,
    },

    /// A read was requested above the committed ledger tip
    #[error("requested state version {requested} is ahead of committed version {committed}")]
    VersionAhead {
        /// Version the caller asked for
        requested: StateVersion,
        /// Highest committed version
        committed: StateVersion,
    },

    /// The read was cancelled by its caller
    #[error("operation cancelled")]
    Cancelled,

    /// Request shape is not supported
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration rejected at load or validation time
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a `NotFound` error
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    /// Create a `SchemaInconsistency` error
    pub fn inconsistency(msg: impl Into<String>) -> Self {
        Error::SchemaInconsistency(msg.into())
    }

    /// Create an `InvalidCursor` error
    pub fn invalid_cursor(reason: impl Into<String>) -> Self {
        Error::InvalidCursor {
            reason: reason.into(),
        }
    }

    /// Create an `InvalidInput` error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an `InvalidConfig` error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Whether this error must halt the ingestion pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::NonMonotonicWrite { .. } | Error::SchemaInconsistency(_)
        )
    }

    /// Whether this error was caused by caller input and maps to a client error response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidCursor { .. }
                | Error::InvalidInput(_)
                | Error::VersionAhead { .. }
                | Error::NotFound(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
