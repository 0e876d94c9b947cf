//! Core types shared by the provider and the CLI

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::FmcVersion;

/// Terraform type name of the DNS server groups bulk resource
pub const DNS_SERVER_GROUPS: &str = "fmc_dns_server_groups";
/// Terraform type name of the ICMPv4 objects bulk resource
pub const ICMPV4_OBJECTS: &str = "fmc_icmpv4_objects";
/// Terraform type name of the SLA monitors bulk resource
pub const SLA_MONITORS: &str = "fmc_sla_monitors";

/// Bulk operation kinds gated by backend version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    Create,
    Delete,
    Update,
}

impl std::fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BulkOperation::Create => write!(f, "create"),
            BulkOperation::Delete => write!(f, "delete"),
            BulkOperation::Update => write!(f, "update"),
        }
    }
}

/// Minimum FMC versions for a resource kind.
///
/// `None` means the capability is never available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkCapabilities {
    /// Minimum version for the resource to be usable at all
    pub min_version: Option<FmcVersion>,
    pub bulk_create: Option<FmcVersion>,
    pub bulk_delete: Option<FmcVersion>,
    pub bulk_update: Option<FmcVersion>,
}

impl BulkCapabilities {
    /// Whether `op` may use the bulk endpoint on `version`
    pub fn supports(&self, op: BulkOperation, version: &FmcVersion) -> bool {
        let min = match op {
            BulkOperation::Create => &self.bulk_create,
            BulkOperation::Delete => &self.bulk_delete,
            BulkOperation::Update => &self.bulk_update,
        };
        min.as_ref().is_some_and(|min| version.at_least(min))
    }

    /// Fail when the resource itself is not available on `version`
    pub fn ensure_available(&self, resource: &str, version: &FmcVersion) -> Result<()> {
        match &self.min_version {
            Some(min) if !version.at_least(min) => Err(Error::VersionIncompatible {
                resource: resource.to_string(),
                required: min.to_string(),
                actual: version.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Capability lookup keyed by Terraform type name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityTable(BTreeMap<String, BulkCapabilities>);

impl Default for CapabilityTable {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        table.insert(
            DNS_SERVER_GROUPS.to_string(),
            BulkCapabilities::default(),
        );
        table.insert(
            ICMPV4_OBJECTS.to_string(),
            BulkCapabilities {
                min_version: None,
                bulk_create: Some(FmcVersion::new(6, 4, 0)),
                bulk_delete: Some(FmcVersion::new(7, 4, 0)),
                bulk_update: None,
            },
        );
        table.insert(
            SLA_MONITORS.to_string(),
            BulkCapabilities {
                min_version: Some(FmcVersion::new(6, 3, 0)),
                bulk_create: Some(FmcVersion::new(7, 4, 0)),
                bulk_delete: Some(FmcVersion::new(7, 4, 0)),
                bulk_update: None,
            },
        );
        Self(table)
    }
}

impl CapabilityTable {
    /// An empty table: every resource falls back to one-by-one calls
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Capabilities for `resource`, or the all-`None` set when unknown
    pub fn get(&self, resource: &str) -> BulkCapabilities {
        self.0.get(resource).cloned().unwrap_or_default()
    }

    pub fn insert(&mut self, resource: impl Into<String>, caps: BulkCapabilities) {
        self.0.insert(resource.into(), caps);
    }

    /// Overlay entries from `other`, replacing whole per-resource records
    pub fn merge(&mut self, other: &CapabilityTable) {
        for (resource, caps) in &other.0 {
            self.0.insert(resource.clone(), caps.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BulkCapabilities)> {
        self.0.iter()
    }
}

/// Batch sizing for bulk requests.
///
/// Creates are bounded by item count (request body), deletes by the length of
/// the encoded id filter (query string).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchLimits {
    pub max_create_items: usize,
    pub max_delete_param_len: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_create_items: 1000,
            max_delete_param_len: 7000,
        }
    }
}
