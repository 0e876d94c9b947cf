//! FMC Provider Implementation
//!
//! Dispatches resource operations by type name and turns failures into
//! diagnostics. A failed apply still hands back whatever state the backend
//! confirmed, so the caller can persist it.

use std::sync::Arc;

use fmc_common::{
    BatchLimits, CapabilityTable, Error, FmcVersion, ProviderConfig, Result, DNS_SERVER_GROUPS,
    ICMPV4_OBJECTS, SLA_MONITORS,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::client::{FmcClient, RestClient};
use crate::resources::{
    ApplyResult, BulkHandler, ChangeSummary, DnsServerGroups, Icmpv4Objects, Resource,
    ResourceContext, SlaMonitors,
};

type DnsServerGroupsResource = BulkHandler<DnsServerGroups>;
type Icmpv4ObjectsResource = BulkHandler<Icmpv4Objects>;
type SlaMonitorsResource = BulkHandler<SlaMonitors>;

/// Resource types served by this provider
pub const RESOURCE_TYPES: &[&str] = &[DNS_SERVER_GROUPS, ICMPV4_OBJECTS, SLA_MONITORS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: &str, err: &Error) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.to_string(),
            detail: err.to_string(),
        }
    }
}

/// State returned by apply, read and import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceResponse {
    pub state: Option<Value>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResourceResponse {
    fn ok(state: Option<Value>) -> Self {
        Self {
            state,
            diagnostics: vec![],
        }
    }

    fn failed(state: Option<Value>, summary: &str, err: &Error) -> Self {
        Self {
            state,
            diagnostics: vec![Diagnostic::error(summary, err)],
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanResponse {
    pub planned_state: Option<Value>,
    pub changes: ChangeSummary,
    pub diagnostics: Vec<Diagnostic>,
}

/// FMC bulk provider
pub struct FmcProvider {
    client: Arc<dyn RestClient>,
    capabilities: CapabilityTable,
    limits: BatchLimits,
}

impl FmcProvider {
    pub fn new(client: Arc<dyn RestClient>, capabilities: CapabilityTable, limits: BatchLimits) -> Self {
        Self {
            client,
            capabilities,
            limits,
        }
    }

    /// Log in to FMC and build a provider from configuration
    pub async fn connect(config: &ProviderConfig) -> Result<Self> {
        let client = FmcClient::connect(config).await?;
        info!("Connected to FMC {}", client.version());
        Ok(Self::new(
            Arc::new(client),
            config.effective_capabilities(),
            config.limits,
        ))
    }

    pub fn version(&self) -> &FmcVersion {
        self.client.version()
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    pub fn limits(&self) -> BatchLimits {
        self.limits
    }

    fn context(&self) -> ResourceContext<'_> {
        ResourceContext {
            client: self.client.as_ref(),
            capabilities: &self.capabilities,
            limits: self.limits,
        }
    }

    /// Planned state plus the item-level changes it implies.
    ///
    /// Works offline: planning never talks to FMC.
    pub fn plan(type_name: &str, prior: Option<&Value>, config: &Value) -> PlanResponse {
        debug!("Plan called for {}", type_name);
        let prior = prior.filter(|v| !v.is_null());

        let planned = match type_name {
            DNS_SERVER_GROUPS => DnsServerGroupsResource::plan(prior, config),
            ICMPV4_OBJECTS => Icmpv4ObjectsResource::plan(prior, config),
            SLA_MONITORS => SlaMonitorsResource::plan(prior, config),
            _ => Err(Error::UnknownResourceType(type_name.to_string())),
        };

        let changes = planned.and_then(|planned| {
            let changes = match type_name {
                DNS_SERVER_GROUPS => DnsServerGroupsResource::changes(prior, &planned),
                ICMPV4_OBJECTS => Icmpv4ObjectsResource::changes(prior, &planned),
                _ => SlaMonitorsResource::changes(prior, &planned),
            }?;
            Ok((planned, changes))
        });

        match changes {
            Ok((planned, changes)) => PlanResponse {
                planned_state: Some(planned),
                changes,
                diagnostics: vec![],
            },
            Err(e) => PlanResponse {
                planned_state: None,
                changes: ChangeSummary::default(),
                diagnostics: vec![Diagnostic::error("Failed to plan resource change", &e)],
            },
        }
    }

    /// Create, update or delete depending on which of prior and planned are set
    pub async fn apply(&self, type_name: &str, prior: Option<&Value>, planned: Option<&Value>) -> ResourceResponse {
        info!("Apply called for {}", type_name);
        let ctx = self.context();
        let prior = prior.filter(|v| !v.is_null());
        let planned = planned.filter(|v| !v.is_null());

        let result: ApplyResult = match (prior, planned) {
            // Create
            (None, Some(planned)) => match type_name {
                DNS_SERVER_GROUPS => DnsServerGroupsResource::create(&ctx, planned).await,
                ICMPV4_OBJECTS => Icmpv4ObjectsResource::create(&ctx, planned).await,
                SLA_MONITORS => SlaMonitorsResource::create(&ctx, planned).await,
                _ => Err(Error::UnknownResourceType(type_name.to_string()).into()),
            },
            // Delete
            (Some(prior), None) => match type_name {
                DNS_SERVER_GROUPS => DnsServerGroupsResource::delete(&ctx, prior).await,
                ICMPV4_OBJECTS => Icmpv4ObjectsResource::delete(&ctx, prior).await,
                SLA_MONITORS => SlaMonitorsResource::delete(&ctx, prior).await,
                _ => Err(Error::UnknownResourceType(type_name.to_string()).into()),
            },
            // Update
            (Some(prior), Some(planned)) => match type_name {
                DNS_SERVER_GROUPS => DnsServerGroupsResource::update(&ctx, prior, planned).await,
                ICMPV4_OBJECTS => Icmpv4ObjectsResource::update(&ctx, prior, planned).await,
                SLA_MONITORS => SlaMonitorsResource::update(&ctx, prior, planned).await,
                _ => Err(Error::UnknownResourceType(type_name.to_string()).into()),
            },
            // No change
            (None, None) => Ok(Value::Null),
        };

        match result {
            Ok(state) => ResourceResponse::ok(Some(state).filter(|s| !s.is_null())),
            Err(failure) => {
                error!("Apply of {} failed: {}", type_name, failure.error);
                let state = failure.state.or_else(|| prior.cloned());
                ResourceResponse::failed(state, "Failed to apply resource change", &failure.error)
            }
        }
    }

    /// Refresh `state` from FMC; a `None` state means the resource is gone
    pub async fn read(&self, type_name: &str, state: &Value) -> ResourceResponse {
        info!("Read called for {}", type_name);
        let ctx = self.context();

        let result = match type_name {
            DNS_SERVER_GROUPS => DnsServerGroupsResource::read(&ctx, state).await,
            ICMPV4_OBJECTS => Icmpv4ObjectsResource::read(&ctx, state).await,
            SLA_MONITORS => SlaMonitorsResource::read(&ctx, state).await,
            _ => Err(Error::UnknownResourceType(type_name.to_string())),
        };

        match result {
            Ok(state) => ResourceResponse::ok(state),
            Err(e) => ResourceResponse::failed(
                Some(state.clone()).filter(|s| !s.is_null()),
                "Failed to read resource",
                &e,
            ),
        }
    }

    pub async fn import(&self, type_name: &str, id: &str) -> ResourceResponse {
        info!("Import called for {} with ID {}", type_name, id);
        let ctx = self.context();

        let result = match type_name {
            DNS_SERVER_GROUPS => DnsServerGroupsResource::import(&ctx, id).await,
            ICMPV4_OBJECTS => Icmpv4ObjectsResource::import(&ctx, id).await,
            SLA_MONITORS => SlaMonitorsResource::import(&ctx, id).await,
            _ => Err(Error::UnknownResourceType(type_name.to_string())),
        };

        match result {
            Ok(state) => ResourceResponse::ok(Some(state)),
            Err(e) => ResourceResponse::failed(None, "Failed to import resource", &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{created_echo, Call, MockClient};
    use serde_json::json;

    fn provider<F>(version: FmcVersion, handler: F) -> (FmcProvider, Arc<MockClient>)
    where
        F: Fn(&Call) -> Result<Value> + Send + Sync + 'static,
    {
        let client = Arc::new(MockClient::new(version, handler));
        let provider = FmcProvider::new(client.clone(), CapabilityTable::default(), BatchLimits::default());
        (provider, client)
    }

    #[test]
    fn test_unknown_type_is_a_diagnostic() {
        let response = FmcProvider::plan("fmc_hosts", None, &json!({"items": {}}));
        assert!(response.planned_state.is_none());
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].severity, Severity::Error);
        assert!(response.diagnostics[0].detail.contains("fmc_hosts"));
    }

    #[test]
    fn test_plan_reports_changes() {
        let response = FmcProvider::plan(
            DNS_SERVER_GROUPS,
            None,
            &json!({"items": {"corp": {"dns_servers": [{"ip": "10.0.0.53"}]}}}),
        );
        assert!(response.diagnostics.is_empty());
        assert_eq!(response.changes.create, vec!["corp"]);
        assert!(response.changes.delete.is_empty());
    }

    #[tokio::test]
    async fn test_apply_create_then_delete() {
        let (provider, client) = provider(FmcVersion::new(7, 4, 0), created_echo);

        let planned = FmcProvider::plan(
            SLA_MONITORS,
            None,
            &json!({"items": {"isp": {"sla_monitor_id": 1, "monitor_address": "192.0.2.1"}}}),
        )
        .planned_state
        .unwrap();
        let created = provider.apply(SLA_MONITORS, None, Some(&planned)).await;
        assert!(!created.has_errors());
        let state = created.state.unwrap();
        assert_eq!(state["items"]["isp"]["id"], json!("id-isp"));

        let deleted = provider.apply(SLA_MONITORS, Some(&state), None).await;
        assert!(!deleted.has_errors());
        assert!(deleted.state.is_none());
        assert_eq!(client.count("DELETE"), 1);
    }

    #[tokio::test]
    async fn test_failed_apply_keeps_partial_state() {
        // below the ICMPv4 bulk create threshold, so one POST per item
        let (provider, _) = provider(FmcVersion::new(6, 3, 0), |call| {
            let name = call.body.as_ref().and_then(|b| b["name"].as_str()).unwrap_or_default();
            if name == "b" {
                return Err(Error::Http {
                    status: 422,
                    message: "Invalid icmpType".to_string(),
                });
            }
            created_echo(call)
        });

        let planned = FmcProvider::plan(
            ICMPV4_OBJECTS,
            None,
            &json!({"items": {"a": {"icmp_type": "8"}, "b": {"icmp_type": "999"}}}),
        )
        .planned_state
        .unwrap();
        let response = provider.apply(ICMPV4_OBJECTS, None, Some(&planned)).await;

        assert!(response.has_errors());
        assert_eq!(response.diagnostics[0].summary, "Failed to apply resource change");
        assert!(response.diagnostics[0].detail.contains("Invalid icmpType"));
        let state = response.state.unwrap();
        assert_eq!(state["items"]["a"]["id"], json!("id-a"));
        assert!(state["items"].get("b").is_none());
    }

    #[tokio::test]
    async fn test_unsupported_version_fails_with_prior_state() {
        let (provider, client) = provider(FmcVersion::new(6, 2, 0), created_echo);
        let prior = json!({"id": "res-1", "items": {"isp": {"id": "m1", "sla_monitor_id": 1}}});
        let planned = json!({"id": "res-1", "items": {}});

        let response = provider.apply(SLA_MONITORS, Some(&prior), Some(&planned)).await;
        assert!(response.has_errors());
        assert!(response.diagnostics[0].detail.contains("6.3.0"));
        let state = response.state.unwrap();
        assert_eq!(state["id"], json!("res-1"));
        assert_eq!(state["items"]["isp"]["id"], json!("m1"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_read_missing_items() {
        let (provider, _) = provider(FmcVersion::new(7, 4, 0), |_| {
            Ok(json!({"items": [], "paging": {"count": 0}}))
        });
        let state = json!({"id": "res-1", "items": {"echo": {"id": "5"}}});

        let response = provider.read(ICMPV4_OBJECTS, &state).await;
        assert!(!response.has_errors());
        assert_eq!(response.state.unwrap()["items"], json!({}));
    }
}
