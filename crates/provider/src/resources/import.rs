//! Import id parsing for bulk resources
//!
//! Accepted forms: `[name1,name2]` and `Domain,[name1,name2]`.

use fmc_common::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static IMPORT_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?P<domain>[^,\[\]]+?)\s*,\s*)?\[(?P<names>[^\[\]]*)\]\s*$")
        .expect("import id pattern is valid")
});

/// Parsed import id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportId {
    pub domain: Option<String>,
    pub names: Vec<String>,
}

pub fn parse_import_id(id: &str) -> Result<ImportId> {
    let caps = IMPORT_ID.captures(id).ok_or_else(|| {
        Error::InvalidImportId(format!(
            "expected [<name>,...] or <domain>,[<name>,...], got {}",
            id
        ))
    })?;

    let domain = caps
        .name("domain")
        .map(|m| m.as_str().trim().to_string())
        .filter(|d| !d.is_empty());

    let mut names: Vec<String> = Vec::new();
    for name in caps["names"].split(',').map(str::trim) {
        if name.is_empty() {
            return Err(Error::InvalidImportId(format!("empty item name in {}", id)));
        }
        if names.iter().any(|n| n == name) {
            return Err(Error::InvalidImportId(format!("duplicate item name {}", name)));
        }
        names.push(name.to_string());
    }

    Ok(ImportId { domain, names })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_only() {
        let parsed = parse_import_id("[icmp-echo, icmp-reply]").unwrap();
        assert_eq!(parsed.domain, None);
        assert_eq!(parsed.names, vec!["icmp-echo", "icmp-reply"]);
    }

    #[test]
    fn test_with_domain() {
        let parsed = parse_import_id("Global/Branch,[dns1]").unwrap();
        assert_eq!(parsed.domain.as_deref(), Some("Global/Branch"));
        assert_eq!(parsed.names, vec!["dns1"]);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_import_id("dns1,dns2").is_err());
        assert!(parse_import_id("[]").is_err());
        assert!(parse_import_id("[a,,b]").is_err());
        assert!(parse_import_id("[a,a]").is_err());
    }
}
