//! CLI Commands

pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod refresh;
pub mod server;
pub mod types;

use anyhow::{bail, Result};
use fmc_provider::RESOURCE_TYPES;

/// Reject type names the provider does not serve before touching FMC state
pub fn check_type(type_name: &str) -> Result<()> {
    if !RESOURCE_TYPES.contains(&type_name) {
        bail!(
            "Unknown resource type '{}', expected one of: {}",
            type_name,
            RESOURCE_TYPES.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_type() {
        assert!(check_type("fmc_icmpv4_objects").is_ok());
        assert!(check_type("fmc_hosts").is_err());
    }
}
