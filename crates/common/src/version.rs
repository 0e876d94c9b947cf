//! FMC server version handling
//!
//! FMC reports versions like `7.4.1 (build 172)` or `7.0.1.1`. Only the first
//! three numeric components take part in comparisons.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parsed FMC version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FmcVersion(semver::Version);

impl FmcVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse an FMC version string, tolerating build suffixes
    pub fn parse(raw: &str) -> Result<Self> {
        let head = raw
            .trim()
            .split(|c: char| c.is_whitespace() || c == '(' || c == '-')
            .next()
            .unwrap_or_default();

        if head.is_empty() {
            return Err(Error::InvalidVersion(raw.to_string()));
        }

        let mut parts = [0u64; 3];
        for (i, component) in head.split('.').enumerate() {
            if i >= parts.len() {
                break;
            }
            parts[i] = component
                .parse()
                .map_err(|_| Error::InvalidVersion(raw.to_string()))?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Whether this version is at least `min`
    pub fn at_least(&self, min: &FmcVersion) -> bool {
        self >= min
    }
}

impl fmt::Display for FmcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FmcVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FmcVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FmcVersion> for String {
    fn from(value: FmcVersion) -> Self {
        value.to_string()
    }
}
