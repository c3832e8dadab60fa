//! LedgerView facade
//!
//! Owns the shared [`LedgerState`] and the validated configuration, hands out
//! the single [`LedgerWriter`] and any number of [`QueryExecutor`]s.
//!
//! # Example
//!
//! ```
//! use ledgerview_core::{CancelToken, EntityId, StateVersion};
//! use ledgerview_engine::{LedgerView, LedgerViewConfig};
//!
//! let ledger = LedgerView::open(LedgerViewConfig::default()).unwrap();
//! let writer = ledger.writer().unwrap();
//! let v1 = StateVersion::new(1);
//! writer.upsert_metadata(EntityId::new(1), "name", b"Radish".to_vec(), false, v1).unwrap();
//! writer.commit(v1).unwrap();
//!
//! let page = ledger
//!     .query()
//!     .metadata_page(EntityId::new(1), ledger.current_version(), None, &CancelToken::never())
//!     .unwrap();
//! assert_eq!(page.total_count, 1);
//! ```

pub mod config;

pub use config::{LedgerViewConfig, PaginationConfig, CONFIG_FILE_NAME};

use crate::query::QueryExecutor;
use crate::state::LedgerState;
use crate::writer::LedgerWriter;
use ledgerview_core::{Error, Result, StateVersion};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// An indexed ledger with as-of reads.
#[derive(Debug)]
pub struct LedgerView {
    state: Arc<LedgerState>,
    config: LedgerViewConfig,
    writer_taken: AtomicBool,
}

impl LedgerView {
    /// Open an empty ledger with `config`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration fails validation.
    pub fn open(config: LedgerViewConfig) -> Result<Self> {
        config.validate()?;
        info!(
            max_definitions_per_request = config.max_definitions_per_request,
            metadata_page_size = config.metadata.page_size,
            resources_page_size = config.resources.page_size,
            "opened ledger view"
        );
        Ok(Self {
            state: Arc::new(LedgerState::new()),
            config,
            writer_taken: AtomicBool::new(false),
        })
    }

    /// Open an empty ledger configured from the `ledgerview.toml` in `dir`,
    /// writing the default file first if there is none.
    pub fn open_in(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        LedgerViewConfig::write_default_if_missing(&path)?;
        Self::open(LedgerViewConfig::from_file(&path)?)
    }

    /// Validated configuration
    pub fn config(&self) -> &LedgerViewConfig {
        &self.config
    }

    /// Shared stores
    pub fn state(&self) -> &Arc<LedgerState> {
        &self.state
    }

    /// Highest committed version, for callers that pin reads to the tip
    pub fn current_version(&self) -> StateVersion {
        self.state.versions.current()
    }

    /// Take the ledger's writer.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the writer was already taken.
    pub fn writer(&self) -> Result<LedgerWriter> {
        if self.writer_taken.swap(true, Ordering::AcqRel) {
            return Err(Error::invalid_input("ledger writer already taken"));
        }
        Ok(LedgerWriter::new(Arc::clone(&self.state)))
    }

    /// Reader over the shared stores
    pub fn query(&self) -> QueryExecutor<'_> {
        QueryExecutor::new(&self.state, &self.config)
    }
}
