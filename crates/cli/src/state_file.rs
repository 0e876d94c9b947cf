//! Local resource state files
//!
//! A state file holds the JSON state of one bulk resource. Writes go through
//! a temporary file in the same directory and a rename, so a crash mid-write
//! never leaves a truncated state behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored state; `None` when the file is missing, empty or null
    pub fn load(&self) -> Result<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("State file {} is not valid JSON", self.path.display()))?;
        Ok(Some(value).filter(|v| !v.is_null()))
    }

    /// Persist `state`, or remove the file when there is no state left
    pub fn save(&self, state: Option<&Value>) -> Result<()> {
        let Some(state) = state else {
            if self.path.exists() {
                debug!("Removing state file {}", self.path.display());
                std::fs::remove_file(&self.path)
                    .with_context(|| format!("Failed to remove {}", self.path.display()))?;
            }
            return Ok(());
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        serde_json::to_writer_pretty(&mut tmp, state)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write state file {}", self.path.display()))?;

        debug!("Wrote state file {}", self.path.display());
        Ok(())
    }
}

/// Read a desired-configuration JSON file
pub fn load_desired(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_has_no_state() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::new(dir.path().join("absent.json"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::new(dir.path().join("nested").join("icmp.json"));

        let state = json!({"id": "res-1", "items": {"echo": {"id": "5"}}});
        file.save(Some(&state)).unwrap();
        assert_eq!(file.load().unwrap(), Some(state));

        // no temporary files left next to the state
        let entries = std::fs::read_dir(dir.path().join("nested")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_save_none_removes_file() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::new(dir.path().join("dns.json"));

        file.save(Some(&json!({"items": {}}))).unwrap();
        assert!(file.path().exists());
        file.save(None).unwrap();
        assert!(!file.path().exists());
        file.save(None).unwrap();
    }

    #[test]
    fn test_null_state_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("null.json");
        std::fs::write(&path, "null\n").unwrap();
        assert!(StateFile::new(path).load().unwrap().is_none());
    }

    #[test]
    fn test_invalid_desired_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("desired.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_desired(&path).is_err());
    }
}
