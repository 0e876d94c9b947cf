//! Server Command

use anyhow::Result;
use fmc_common::{BulkCapabilities, BulkOperation, FmcVersion};
use fmc_provider::FmcProvider;
use serde::Serialize;

use crate::output::{print_item, print_list, OutputFormat, TableDisplay};

#[derive(Serialize)]
pub struct ServerDisplay {
    pub version: String,
    pub max_create_items: usize,
    pub max_delete_param_len: usize,
}

impl TableDisplay for ServerDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["FMC Version", "Create Batch", "Delete Filter Length"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.version.clone(),
            self.max_create_items.to_string(),
            self.max_delete_param_len.to_string(),
        ]
    }
}

/// Bulk support of one resource type on the connected FMC
#[derive(Serialize)]
pub struct CapabilityDisplay {
    pub resource: String,
    pub available: bool,
    pub bulk_create: bool,
    pub bulk_delete: bool,
    pub bulk_update: bool,
}

impl CapabilityDisplay {
    fn new(resource: &str, caps: &BulkCapabilities, version: &FmcVersion) -> Self {
        Self {
            resource: resource.to_string(),
            available: caps.ensure_available(resource, version).is_ok(),
            bulk_create: caps.supports(BulkOperation::Create, version),
            bulk_delete: caps.supports(BulkOperation::Delete, version),
            bulk_update: caps.supports(BulkOperation::Update, version),
        }
    }
}

impl TableDisplay for CapabilityDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Resource", "Available", "Bulk Create", "Bulk Delete", "Bulk Update"]
    }

    fn row(&self) -> Vec<String> {
        let yes_no = |b: bool| if b { "yes" } else { "no" }.to_string();
        vec![
            self.resource.clone(),
            yes_no(self.available),
            yes_no(self.bulk_create),
            yes_no(self.bulk_delete),
            yes_no(self.bulk_update),
        ]
    }
}

pub fn execute(provider: FmcProvider, format: OutputFormat) -> Result<()> {
    let version = provider.version();
    let limits = provider.limits();

    print_item(
        &ServerDisplay {
            version: version.to_string(),
            max_create_items: limits.max_create_items,
            max_delete_param_len: limits.max_delete_param_len,
        },
        format,
    );

    let capabilities: Vec<CapabilityDisplay> = provider
        .capabilities()
        .iter()
        .map(|(resource, caps)| CapabilityDisplay::new(resource, caps, version))
        .collect();
    print_list(&capabilities, format);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_row_for_old_fmc() {
        let caps = BulkCapabilities {
            min_version: Some(FmcVersion::new(6, 3, 0)),
            bulk_create: Some(FmcVersion::new(7, 4, 0)),
            bulk_delete: Some(FmcVersion::new(7, 4, 0)),
            bulk_update: None,
        };
        let row = CapabilityDisplay::new("fmc_sla_monitors", &caps, &FmcVersion::new(7, 2, 0)).row();
        assert_eq!(row, vec!["fmc_sla_monitors", "yes", "no", "no", "no"]);
    }
}
