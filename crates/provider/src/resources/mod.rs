//! Resource Implementations
//!
//! Implements the CRUD operations for each resource type.

pub mod bulk_handler;
pub mod dns_server_groups;
pub mod icmpv4_objects;
pub mod import;
pub mod sla_monitors;

use fmc_common::{BatchLimits, CapabilityTable, Error, Result};
use serde::Serialize;
use serde_json::Value;

use crate::bulk::BulkItem;
use crate::client::RestClient;

pub use bulk_handler::{BulkHandler, BulkState};
pub use dns_server_groups::DnsServerGroups;
pub use icmpv4_objects::Icmpv4Objects;
pub use sla_monitors::SlaMonitors;

/// What a resource operation needs from the provider
pub struct ResourceContext<'a> {
    pub client: &'a dyn RestClient,
    pub capabilities: &'a CapabilityTable,
    pub limits: BatchLimits,
}

/// A failed apply, with the state to persist when some changes went through
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ApplyFailure {
    pub state: Option<Value>,
    #[source]
    pub error: Error,
}

impl From<Error> for ApplyFailure {
    fn from(error: Error) -> Self {
        Self { state: None, error }
    }
}

impl From<serde_json::Error> for ApplyFailure {
    fn from(error: serde_json::Error) -> Self {
        Self {
            state: None,
            error: error.into(),
        }
    }
}

pub type ApplyResult = std::result::Result<Value, ApplyFailure>;

/// Item names a plan would create, update and delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub create: Vec<String>,
    pub update: Vec<String>,
    pub delete: Vec<String>,
}

impl ChangeSummary {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// Trait for resource operations
#[async_trait::async_trait]
pub trait Resource {
    /// Resource type name
    fn type_name() -> &'static str;

    /// Planned state for `config`, given the prior state
    fn plan(prior: Option<&Value>, config: &Value) -> Result<Value>;

    /// What applying `planned` over `prior` would change
    fn changes(prior: Option<&Value>, planned: &Value) -> Result<ChangeSummary>;

    /// Create a new resource
    async fn create(ctx: &ResourceContext<'_>, planned: &Value) -> ApplyResult;

    /// Read an existing resource; `None` when it no longer exists
    async fn read(ctx: &ResourceContext<'_>, state: &Value) -> Result<Option<Value>>;

    /// Update an existing resource
    async fn update(ctx: &ResourceContext<'_>, prior: &Value, planned: &Value) -> ApplyResult;

    /// Delete a resource; success yields a null state
    async fn delete(ctx: &ResourceContext<'_>, prior: &Value) -> ApplyResult;

    /// Build state for an existing backend resource
    async fn import(ctx: &ResourceContext<'_>, id: &str) -> Result<Value>;
}

/// Per-type adapter for bulk resources
pub trait BulkResource: Send + Sync + 'static {
    type Item: BulkItem;

    /// Terraform type name, also the capability table key
    const TYPE_NAME: &'static str;

    /// Collection path below the domain, e.g. `object/icmpv4objects`
    const PATH_SUFFIX: &'static str;

    fn collection_path(domain_uuid: &str) -> String {
        format!(
            "/api/fmc_config/v1/domain/{}/{}",
            domain_uuid,
            Self::PATH_SUFFIX
        )
    }
}
