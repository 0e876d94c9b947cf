//! Types Command

use anyhow::Result;
use fmc_common::CapabilityTable;
use fmc_provider::RESOURCE_TYPES;
use serde::Serialize;

use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Serialize)]
pub struct TypeDisplay {
    pub name: String,
    pub min_version: String,
}

impl TableDisplay for TypeDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Resource Type", "Minimum FMC"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.min_version.clone()]
    }
}

pub fn execute(format: OutputFormat) -> Result<()> {
    let table = CapabilityTable::default();
    let types: Vec<TypeDisplay> = RESOURCE_TYPES
        .iter()
        .map(|name| TypeDisplay {
            name: name.to_string(),
            min_version: table
                .get(name)
                .min_version
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    print_list(&types, format);
    Ok(())
}
