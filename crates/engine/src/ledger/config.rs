//! Query configuration via `ledgerview.toml`
//!
//! Every paginated read family has its own `[section]` with a page size, a
//! definition lookahead budget and a traversal direction. A default file is
//! written on first start; edit it and restart to change the settings.

use ledgerview_core::{Direction, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Config file name placed in the service's data directory.
pub const CONFIG_FILE_NAME: &str = "ledgerview.toml";

const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_LOOKAHEAD: usize = 1_000;
const DEFAULT_MAX_DEFINITIONS: usize = 10_000;

/// Paging knobs of one read family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Items per page
    pub page_size: usize,
    /// Definitions scanned per page, must exceed `page_size`
    pub definition_lookahead_limit: usize,
    /// Traversal direction, newest first by default
    pub direction: Direction,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            definition_lookahead_limit: DEFAULT_LOOKAHEAD,
            direction: Direction::Descending,
        }
    }
}

impl PaginationConfig {
    /// Create a pagination config
    pub const fn new(page_size: usize, definition_lookahead_limit: usize, direction: Direction) -> Self {
        Self {
            page_size,
            definition_lookahead_limit,
            direction,
        }
    }

    /// Same config with a different page size
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Same config with a different lookahead budget
    pub const fn with_lookahead(mut self, definition_lookahead_limit: usize) -> Self {
        self.definition_lookahead_limit = definition_lookahead_limit;
        self
    }

    /// Validate the knobs.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `page_size` is zero or the lookahead budget does not
    /// exceed it.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_config("page_size must be at least 1"));
        }
        if self.definition_lookahead_limit <= self.page_size {
            return Err(Error::invalid_config(format!(
                "definition_lookahead_limit ({}) must be greater than page_size ({})",
                self.definition_lookahead_limit, self.page_size
            )));
        }
        Ok(())
    }
}

/// Service configuration loaded from `ledgerview.toml`.
///
/// # Example
///
/// ```toml
/// max_definitions_per_request = 10000
///
/// [metadata]
/// page_size = 100
/// definition_lookahead_limit = 1000
/// direction = "descending"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerViewConfig {
    /// Definition budget shared by all entities of one multi-entity read
    pub max_definitions_per_request: usize,
    /// Entity metadata pages
    pub metadata: PaginationConfig,
    /// Key-value store key pages
    pub key_value_store: PaginationConfig,
    /// Entity resource pages
    pub resources: PaginationConfig,
    /// Vault pages under one resource
    pub vaults: PaginationConfig,
    /// Non-fungible id pages of one resource
    pub non_fungible_ids: PaginationConfig,
}

impl Default for LedgerViewConfig {
    fn default() -> Self {
        Self {
            max_definitions_per_request: DEFAULT_MAX_DEFINITIONS,
            metadata: PaginationConfig::default(),
            key_value_store: PaginationConfig::default(),
            resources: PaginationConfig::default(),
            vaults: PaginationConfig::default(),
            non_fungible_ids: PaginationConfig::default(),
        }
    }
}

impl LedgerViewConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the first offending section.
    pub fn validate(&self) -> Result<()> {
        let sections = [
            ("metadata", &self.metadata),
            ("key_value_store", &self.key_value_store),
            ("resources", &self.resources),
            ("vaults", &self.vaults),
            ("non_fungible_ids", &self.non_fungible_ids),
        ];
        for (name, section) in sections {
            section.validate().map_err(|e| match e {
                Error::InvalidConfig(msg) => Error::invalid_config(format!("[{}] {}", name, msg)),
                other => other,
            })?;
        }
        if self.max_definitions_per_request <= self.metadata.page_size {
            return Err(Error::invalid_config(format!(
                "max_definitions_per_request ({}) must be greater than [metadata] page_size ({})",
                self.max_definitions_per_request, self.metadata.page_size
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# LedgerView query configuration
#
# Definition budget shared by all entities of one multi-entity metadata read.
# Split evenly across the requested entities.
max_definitions_per_request = 10000

# Each section below configures one family of paginated reads:
#   page_size                  = items per page (>= 1)
#   definition_lookahead_limit = definitions scanned per page (> page_size)
#   direction                  = "descending" (newest first) or "ascending"

[metadata]
page_size = 100
definition_lookahead_limit = 1000
direction = "descending"

[key_value_store]
page_size = 100
definition_lookahead_limit = 1000
direction = "descending"

[resources]
page_size = 100
definition_lookahead_limit = 1000
direction = "descending"

[vaults]
page_size = 100
definition_lookahead_limit = 1000
direction = "descending"

[non_fungible_ids]
page_size = 100
definition_lookahead_limit = 1000
direction = "descending"
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LedgerViewConfig = toml::from_str(content)
            .map_err(|e| Error::invalid_config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `InvalidConfig` if it cannot be parsed
    /// or fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LedgerViewConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_config(format!("failed to parse '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
            info!(path = %path.display(), "wrote default configuration");
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
