//! Provider configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{BatchLimits, CapabilityTable};

/// Connection and tuning settings for the FMC provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the FMC, e.g. `https://fmc.example.com`
    pub url: String,

    /// Username for token generation
    pub username: Option<String>,

    /// Password for token generation
    pub password: Option<String>,

    /// Pre-issued API token; replaces the username/password login
    pub token: Option<String>,

    /// Default FMC domain name; the login domain is used when unset
    pub domain: Option<String>,

    /// Skip TLS certificate verification
    pub insecure: bool,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Bulk batch sizing
    pub limits: BatchLimits,

    /// Per-resource overrides of the built-in capability table
    pub capabilities: CapabilityTable,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: None,
            password: None,
            token: None,
            domain: None,
            insecure: false,
            request_timeout_secs: 60,
            limits: BatchLimits::default(),
            capabilities: CapabilityTable::empty(),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading provider config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Overlay `FMC_*` environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay settings from a variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FMC_URL") {
            self.url = url;
        }
        if let Some(username) = lookup("FMC_USERNAME") {
            self.username = Some(username);
        }
        if let Some(password) = lookup("FMC_PASSWORD") {
            self.password = Some(password);
        }
        if let Some(token) = lookup("FMC_TOKEN") {
            self.token = Some(token);
        }
        if let Some(domain) = lookup("FMC_DOMAIN") {
            self.domain = Some(domain);
        }
        if let Some(insecure) = lookup("FMC_INSECURE") {
            self.insecure = matches!(insecure.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Check that enough is set to reach an FMC
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::InvalidConfig("url must be set".to_string()));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "url must start with http:// or https://, got {}",
                self.url
            )));
        }
        let has_login = self.username.is_some() && self.password.is_some();
        if self.token.is_none() && !has_login {
            return Err(Error::InvalidConfig(
                "either token or username and password must be set".to_string(),
            ));
        }
        if self.limits.max_create_items == 0 || self.limits.max_delete_param_len == 0 {
            return Err(Error::InvalidConfig(
                "batch limits must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Built-in capability table with configured overrides applied
    pub fn effective_capabilities(&self) -> CapabilityTable {
        let mut table = CapabilityTable::default();
        table.merge(&self.capabilities);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BulkOperation, ICMPV4_OBJECTS};
    use crate::version::FmcVersion;
    use std::collections::HashMap;

    #[test]
    fn test_from_toml() {
        let config = ProviderConfig::from_toml(
            r#"
            url = "https://fmc.example.com"
            username = "admin"
            password = "secret"
            insecure = true

            [limits]
            max_create_items = 50

            [capabilities.fmc_icmpv4_objects]
            bulk_create = "7.0"
            bulk_delete = "7.0"
            "#,
        )
        .unwrap();

        assert_eq!(config.url, "https://fmc.example.com");
        assert!(config.insecure);
        assert_eq!(config.limits.max_create_items, 50);
        assert_eq!(config.limits.max_delete_param_len, 7000);
        config.validate().unwrap();

        let caps = config.effective_capabilities().get(ICMPV4_OBJECTS);
        assert!(caps.supports(BulkOperation::Delete, &FmcVersion::new(7, 0, 0)));
    }

    #[test]
    fn test_env_overlay() {
        let vars: HashMap<&str, &str> = [
            ("FMC_URL", "https://10.0.0.1"),
            ("FMC_TOKEN", "abc"),
            ("FMC_INSECURE", "TRUE"),
        ]
        .into_iter()
        .collect();

        let mut config = ProviderConfig::default();
        config.apply_env_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.url, "https://10.0.0.1");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert!(config.insecure);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_requires_credentials() {
        let config = ProviderConfig {
            url: "https://fmc".to_string(),
            username: Some("admin".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = ProviderConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert!(config.url.is_empty());
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("provider.toml");
        std::fs::write(&path, "url = \"https://fmc\"\ntoken = \"t\"\n").unwrap();

        let config = ProviderConfig::load(&path).unwrap();
        assert_eq!(config.token.as_deref(), Some("t"));
    }
}
