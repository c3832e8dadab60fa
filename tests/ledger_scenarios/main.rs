//! End-to-end ledger scenarios through the `ledgerview` facade.
//!
//! Each module drives a full write → commit → as-of read cycle:
//! - `metadata`: single and multi-entity metadata reads
//! - `key_value`: key-value store pages over binary keys
//! - `non_fungible`: minted and burned non-fungible ids of a resource
//! - `versioning`: version pinning, sealed versions, concurrent readers
//! - `config`: `ledgerview.toml` loading

mod common;

mod config;
mod metadata;
mod non_fungible;
mod versioning;
