//! Provider construction from config file and environment

use std::path::Path;

use anyhow::{Context, Result};
use fmc_common::{default_config_path, ProviderConfig};
use fmc_provider::FmcProvider;
use tracing::debug;

/// Load `ProviderConfig` from `path` (or the default location) with the
/// `FMC_*` environment applied on top
pub fn load_config(path: Option<&Path>) -> Result<ProviderConfig> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    debug!("Using provider config {}", path.display());

    let mut config = ProviderConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env();
    config.validate().context("Invalid provider configuration")?;
    Ok(config)
}

/// Connect to the configured FMC
pub async fn connect(path: Option<&Path>) -> Result<FmcProvider> {
    let config = load_config(path)?;
    FmcProvider::connect(&config)
        .await
        .with_context(|| format!("Cannot connect to FMC at {}", config.url))
}
