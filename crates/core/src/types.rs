//! Core types for LedgerView
//!
//! This module defines the foundational types:
//! - Surrogate ids: EntityId, DefinitionId, RowId
//! - ResourceKind: fungible / non-fungible split of an entity's resources
//! - ResourceScope / VaultScope: parent keys of the resource and vault levels
//! - Balance: raw token amount in sub-units

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! surrogate_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw id
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw id
            #[inline]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

surrogate_id!(
    /// Ledger entity (component, account, resource, vault, key-value store)
    EntityId,
    "entity"
);

surrogate_id!(
    /// Identity of a `(parent, key)` pair in an attribute store.
    ///
    /// Allocated from 1 in creation order, so a larger id was created later.
    DefinitionId,
    "def"
);

surrogate_id!(
    /// Id of an append-only row (history, rollup snapshot, totals snapshot).
    ///
    /// Allocated from 1 in insertion order; breaks ties between rows that
    /// share a `from_version`.
    RowId,
    "row"
);

/// Whether a resource is fungible or non-fungible.
///
/// An entity's resources are kept as two independent series so each kind
/// paginates and counts on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Divisible token balance
    Fungible,
    /// Collection of unique ids
    NonFungible,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Fungible => f.write_str("fungible"),
            ResourceKind::NonFungible => f.write_str("non_fungible"),
        }
    }
}

/// Parent key of the resource level: one entity's resources of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceScope {
    /// Owning entity
    pub entity: EntityId,
    /// Resource kind
    pub kind: ResourceKind,
}

impl ResourceScope {
    /// Create a resource scope
    pub const fn new(entity: EntityId, kind: ResourceKind) -> Self {
        ResourceScope { entity, kind }
    }
}

impl fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity, self.kind)
    }
}

/// Parent key of the vault level: the vaults an entity holds for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VaultScope {
    /// Owning entity
    pub entity: EntityId,
    /// Resource held in the vaults
    pub resource: EntityId,
}

impl VaultScope {
    /// Create a vault scope
    pub const fn new(entity: EntityId, resource: EntityId) -> Self {
        VaultScope { entity, resource }
    }
}

impl fmt::Display for VaultScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity, self.resource)
    }
}

/// Token amount in sub-units.
///
/// For non-fungible resources this is the count of held ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(u128);

impl Balance {
    /// Zero balance
    pub const ZERO: Balance = Balance(0);

    /// Create a balance from sub-units
    pub const fn new(sub_units: u128) -> Self {
        Balance(sub_units)
    }

    /// Raw sub-units
    pub const fn sub_units(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Balance {
    fn from(v: u128) -> Self {
        Balance(v)
    }
}
