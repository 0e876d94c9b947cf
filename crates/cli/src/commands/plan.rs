//! Plan Command

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use fmc_provider::{ChangeSummary, FmcProvider};
use serde::Serialize;

use super::check_type;
use crate::output::{print_diagnostics, print_info, print_list, OutputFormat, TableDisplay};
use crate::state_file::{load_desired, StateFile};

#[derive(Args)]
pub struct PlanArgs {
    /// Resource type, e.g. fmc_icmpv4_objects
    pub type_name: String,

    /// Desired configuration (JSON)
    #[arg(short, long)]
    pub desired: PathBuf,

    /// State file
    #[arg(short, long)]
    pub state: PathBuf,
}

#[derive(Serialize)]
pub struct ChangeDisplay {
    pub action: &'static str,
    pub item: String,
}

impl TableDisplay for ChangeDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Action", "Item"]
    }

    fn row(&self) -> Vec<String> {
        let action = match self.action {
            "create" => self.action.green().to_string(),
            "delete" => self.action.red().to_string(),
            _ => self.action.yellow().to_string(),
        };
        vec![action, self.item.clone()]
    }
}

pub fn change_rows(changes: &ChangeSummary) -> Vec<ChangeDisplay> {
    let rows = |action: &'static str, names: &[String]| {
        names
            .iter()
            .map(|item| ChangeDisplay {
                action,
                item: item.clone(),
            })
            .collect::<Vec<_>>()
    };

    let mut all = rows("create", &changes.create);
    all.extend(rows("update", &changes.update));
    all.extend(rows("delete", &changes.delete));
    all
}

/// Diff the desired configuration against the state file without contacting FMC
pub fn execute(args: PlanArgs, format: OutputFormat) -> Result<()> {
    check_type(&args.type_name)?;

    let prior = StateFile::new(&args.state).load()?;
    let desired = load_desired(&args.desired)?;

    let plan = FmcProvider::plan(&args.type_name, prior.as_ref(), &desired);
    print_diagnostics(&plan.diagnostics);
    if plan.planned_state.is_none() {
        bail!("Planning {} failed", args.type_name);
    }

    if plan.changes.is_empty() {
        if let OutputFormat::Table = format {
            print_info("No changes. FMC matches the configuration.");
            return Ok(());
        }
    }

    print_list(&change_rows(&plan.changes), format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rows_group_by_action() {
        let changes = ChangeSummary {
            create: vec!["b".to_string()],
            update: vec!["a".to_string()],
            delete: vec!["c".to_string(), "d".to_string()],
        };

        let rows = change_rows(&changes);
        let actions: Vec<&str> = rows.iter().map(|r| r.action).collect();
        assert_eq!(actions, vec!["create", "update", "delete", "delete"]);
        assert_eq!(rows[3].item, "d");
    }

    #[test]
    fn test_plan_needs_no_fmc_connection() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("desired.json");
        std::fs::write(&desired, r#"{"items": {"echo": {"icmp_type": "8"}}}"#).unwrap();

        let args = PlanArgs {
            type_name: "fmc_icmpv4_objects".to_string(),
            desired,
            state: dir.path().join("state.json"),
        };
        execute(args, OutputFormat::Json).unwrap();
        assert!(!dir.path().join("state.json").exists());
    }

    #[test]
    fn test_plan_rejects_unknown_type() {
        let dir = TempDir::new().unwrap();
        let args = PlanArgs {
            type_name: "fmc_hosts".to_string(),
            desired: dir.path().join("desired.json"),
            state: dir.path().join("state.json"),
        };
        assert!(execute(args, OutputFormat::Json).is_err());
    }
}
