//! FMC Bulk Provider
//!
//! Terraform-style resources that manage whole collections of FMC objects
//! (DNS server groups, ICMPv4 objects, SLA monitors) through the FMC REST
//! API, using bulk endpoints where the connected FMC version allows.

pub mod bulk;
pub mod client;
pub mod provider;
pub mod resources;
pub mod state;

#[cfg(test)]
mod testing;

pub use bulk::{classify, BulkItem, BulkReconciler, Changes, ItemMap, PartialApply};
pub use client::{FmcClient, RestClient};
pub use provider::{Diagnostic, FmcProvider, PlanResponse, ResourceResponse, Severity, RESOURCE_TYPES};
pub use resources::{ApplyFailure, ChangeSummary};
