//! FMC Provider Common Library
//!
//! Shared error types, version handling, capability tables and configuration
//! for the FMC provider and its CLI.

pub mod config;
pub mod error;
pub mod types;
pub mod version;

pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use types::*;
pub use version::FmcVersion;

/// Provider version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default provider config path
pub fn default_config_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".fmc")
        .join("provider.toml")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
