//! Entity → resource → vault fan-out
//!
//! Each level pages independently: the resource level with the
//! `[resources]` knobs (one series per resource kind), the vault level with
//! the `[vaults]` knobs. Vault pages are only read when the caller asks for
//! at least one vault per resource.

use super::{decode_cursor, read_page, require_value, QueryExecutor};
use crate::ledger::PaginationConfig;
use ledgerview_core::{
    Balance, CancelToken, Cursor, EntityId, Page, ResourceKind, ResourceScope, Result,
    StateVersion, VaultScope,
};
use ledgerview_storage::ResolvedEntry;
use serde::Serialize;

/// Balance of one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultItem {
    /// Vault entity
    pub vault: EntityId,
    /// Vault balance
    pub amount: Balance,
    /// Version of the latest balance change
    pub last_updated_version: StateVersion,
}

/// Aggregated balance of one resource held by an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceItem {
    /// Resource entity
    pub resource: EntityId,
    /// Resource kind
    pub kind: ResourceKind,
    /// Balance summed over the entity's vaults
    pub amount: Balance,
    /// Version of the latest balance change
    pub last_updated_version: StateVersion,
    /// First vault page, when vaults were requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaults: Option<Page<VaultItem>>,
}

/// Both resource collections of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityResources {
    /// Entity the resources belong to
    pub entity: EntityId,
    /// Fungible resources
    pub fungible: Page<ResourceItem>,
    /// Non-fungible resources
    pub non_fungible: Page<ResourceItem>,
}

/// Shape of an entity resources read.
///
/// Limits are capped at the configured page size; a limit of zero skips the
/// collection's items but still reports its total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcesRequest {
    /// Resume point of the fungible collection
    pub fungible_cursor: Option<String>,
    /// Resume point of the non-fungible collection
    pub non_fungible_cursor: Option<String>,
    /// Fungible page size, configured size when `None`
    pub fungible_limit: Option<usize>,
    /// Non-fungible page size, configured size when `None`
    pub non_fungible_limit: Option<usize>,
    /// Vaults listed per resource; zero bypasses the vault level
    pub vaults_per_resource: usize,
}

impl ResourcesRequest {
    /// Request with configured page sizes and no vaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume the fungible collection
    pub fn fungible_after(mut self, cursor: impl Into<String>) -> Self {
        self.fungible_cursor = Some(cursor.into());
        self
    }

    /// Resume the non-fungible collection
    pub fn non_fungible_after(mut self, cursor: impl Into<String>) -> Self {
        self.non_fungible_cursor = Some(cursor.into());
        self
    }

    /// Override both page sizes
    pub fn with_limits(mut self, fungible: usize, non_fungible: usize) -> Self {
        self.fungible_limit = Some(fungible);
        self.non_fungible_limit = Some(non_fungible);
        self
    }

    /// List up to `count` vaults under every resource
    pub fn with_vaults(mut self, count: usize) -> Self {
        self.vaults_per_resource = count;
        self
    }
}

fn vault_item(entry: ResolvedEntry<EntityId, Balance>) -> Result<VaultItem> {
    let amount = require_value(entry.value, format_args!("vault {}", entry.key))?;
    Ok(VaultItem {
        vault: entry.key,
        amount,
        last_updated_version: entry.last_updated_version,
    })
}

impl<'a> QueryExecutor<'a> {
    /// Fungible and non-fungible resources of `entity`, optionally with the
    /// first vault page of every listed resource.
    pub fn entity_resources(
        &self,
        entity: EntityId,
        as_of: StateVersion,
        request: &ResourcesRequest,
        cancel: &CancelToken,
    ) -> Result<EntityResources> {
        self.pin(as_of)?;
        let fungible = self.resource_level(
            ResourceScope::new(entity, ResourceKind::Fungible),
            as_of,
            request.fungible_cursor.as_deref(),
            request.fungible_limit,
            request.vaults_per_resource,
            cancel,
        )?;
        let non_fungible = self.resource_level(
            ResourceScope::new(entity, ResourceKind::NonFungible),
            as_of,
            request.non_fungible_cursor.as_deref(),
            request.non_fungible_limit,
            request.vaults_per_resource,
            cancel,
        )?;
        Ok(EntityResources {
            entity,
            fungible,
            non_fungible,
        })
    }

    /// One page of the vaults in which `entity` holds `resource`.
    pub fn resource_vaults_page(
        &self,
        entity: EntityId,
        resource: EntityId,
        as_of: StateVersion,
        cursor: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Page<VaultItem>> {
        self.pin(as_of)?;
        let start = decode_cursor(cursor, as_of)?;
        self.vault_level(
            VaultScope::new(entity, resource),
            as_of,
            start,
            &self.config.vaults,
            cancel,
        )
    }

    fn resource_level(
        &self,
        scope: ResourceScope,
        as_of: StateVersion,
        cursor: Option<&str>,
        limit: Option<usize>,
        vaults_per_resource: usize,
        cancel: &CancelToken,
    ) -> Result<Page<ResourceItem>> {
        let total = self
            .state
            .resource_totals
            .get_totals(&scope, as_of)
            .excluding_deleted;
        let start = decode_cursor(cursor, as_of)?;
        let section = self.config.resources;
        let page_size = limit.map_or(section.page_size, |l| l.min(section.page_size));
        if page_size == 0 {
            return Ok(Page::empty(total));
        }

        let mut page = read_page(
            &self.state.resources,
            &section.with_page_size(page_size),
            &scope,
            as_of,
            start,
            cancel,
            total,
            |entry| {
                let amount = require_value(entry.value, format_args!("resource {}", entry.key))?;
                Ok(ResourceItem {
                    resource: entry.key,
                    kind: scope.kind,
                    amount,
                    last_updated_version: entry.last_updated_version,
                    vaults: None,
                })
            },
        )?;

        if vaults_per_resource > 0 {
            let vault_section = self
                .config
                .vaults
                .with_page_size(vaults_per_resource.min(self.config.vaults.page_size));
            for item in &mut page.items {
                let vaults = self.vault_level(
                    VaultScope::new(scope.entity, item.resource),
                    as_of,
                    None,
                    &vault_section,
                    cancel,
                )?;
                item.vaults = Some(vaults);
            }
        }
        Ok(page)
    }

    fn vault_level(
        &self,
        scope: VaultScope,
        as_of: StateVersion,
        start: Option<Cursor>,
        section: &PaginationConfig,
        cancel: &CancelToken,
    ) -> Result<Page<VaultItem>> {
        let total = self
            .state
            .vault_totals
            .get_totals(&scope, as_of)
            .excluding_deleted;
        read_page(
            &self.state.vaults,
            section,
            &scope,
            as_of,
            start,
            cancel,
            total,
            vault_item,
        )
    }
}
