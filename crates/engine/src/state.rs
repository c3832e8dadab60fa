//! Stores that make up an indexed ledger
//!
//! One [`LedgerState`] is shared (behind an `Arc`) by the writer and every
//! reader. It owns no logic beyond construction; writes go through
//! [`LedgerWriter`](crate::LedgerWriter), reads through
//! [`QueryExecutor`](crate::QueryExecutor).

use ledgerview_core::{Balance, EntityId, ResourceScope, VaultScope};
use ledgerview_storage::{AggregateIndex, AttributeStore, TotalsTracker, VersionLog};

/// Entity metadata: `entity -> name -> raw encoded value`
pub type MetadataStore = AttributeStore<EntityId, String, Vec<u8>>;

/// Key-value store entries: `store -> raw key -> raw value`
pub type KeyValueStore = AttributeStore<EntityId, Vec<u8>, Vec<u8>>;

/// Aggregated resource balances: `(entity, kind) -> resource -> balance`
pub type ResourceStore = AttributeStore<ResourceScope, EntityId, Balance>;

/// Vault balances: `(entity, resource) -> vault -> balance`
pub type VaultStore = AttributeStore<VaultScope, EntityId, Balance>;

/// Non-fungible data: `resource -> non-fungible id -> raw encoded data`
pub type NonFungibleStore = AttributeStore<EntityId, String, Vec<u8>>;

/// All stores of one indexed ledger.
#[derive(Debug)]
pub struct LedgerState {
    /// Committed ledger version
    pub versions: VersionLog,
    /// Entity metadata entries
    pub metadata: MetadataStore,
    /// Metadata entry counters per entity
    pub metadata_totals: TotalsTracker<EntityId>,
    /// Key-value store entries
    pub kv_entries: KeyValueStore,
    /// Entry counters per key-value store
    pub kv_totals: TotalsTracker<EntityId>,
    /// Entity resource balances
    pub resources: ResourceStore,
    /// Resource counters per entity and kind
    pub resource_totals: TotalsTracker<ResourceScope>,
    /// Resources per entity and kind, most recently touched first
    pub resource_rollups: AggregateIndex<ResourceScope, EntityId>,
    /// Vault balances
    pub vaults: VaultStore,
    /// Vault counters per entity and resource
    pub vault_totals: TotalsTracker<VaultScope>,
    /// Vaults per entity and resource, most recently touched first
    pub vault_rollups: AggregateIndex<VaultScope, EntityId>,
    /// Non-fungible ids and their data per resource
    pub non_fungibles: NonFungibleStore,
    /// Supply (excluding burned) and minted counters per resource
    pub non_fungible_totals: TotalsTracker<EntityId>,
}

impl LedgerState {
    /// Create empty stores
    pub fn new() -> Self {
        Self {
            versions: VersionLog::new(),
            metadata: AttributeStore::new("metadata"),
            metadata_totals: TotalsTracker::new("metadata_totals"),
            kv_entries: AttributeStore::new("kv_entries"),
            kv_totals: TotalsTracker::new("kv_totals"),
            resources: AttributeStore::new("resources"),
            resource_totals: TotalsTracker::new("resource_totals"),
            resource_rollups: AggregateIndex::new("resource_rollups"),
            vaults: AttributeStore::new("vaults"),
            vault_totals: TotalsTracker::new("vault_totals"),
            vault_rollups: AggregateIndex::new("vault_rollups"),
            non_fungibles: AttributeStore::new("non_fungibles"),
            non_fungible_totals: TotalsTracker::new("non_fungible_totals"),
        }
    }
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new()
    }
}
