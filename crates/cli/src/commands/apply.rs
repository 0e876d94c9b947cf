//! Apply Command

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use fmc_provider::FmcProvider;
use tracing::info;

use super::check_type;
use super::plan::change_rows;
use crate::output::{print_diagnostics, print_info, print_list, print_state, print_success, OutputFormat};
use crate::state_file::{load_desired, StateFile};

#[derive(Args)]
pub struct ApplyArgs {
    /// Resource type, e.g. fmc_icmpv4_objects
    pub type_name: String,

    /// Desired configuration (JSON)
    #[arg(short, long)]
    pub desired: PathBuf,

    /// State file, created when missing
    #[arg(short, long)]
    pub state: PathBuf,
}

pub async fn execute(args: ApplyArgs, provider: FmcProvider, format: OutputFormat) -> Result<()> {
    check_type(&args.type_name)?;

    let state_file = StateFile::new(&args.state);
    let prior = state_file.load()?;
    let desired = load_desired(&args.desired)?;

    let plan = FmcProvider::plan(&args.type_name, prior.as_ref(), &desired);
    print_diagnostics(&plan.diagnostics);
    let Some(planned) = plan.planned_state else {
        bail!("Planning {} failed", args.type_name);
    };

    if prior.is_some() && plan.changes.is_empty() {
        print_info("No changes. FMC matches the configuration.");
        return Ok(());
    }
    if let OutputFormat::Table = format {
        print_list(&change_rows(&plan.changes), format);
    }

    let response = provider
        .apply(&args.type_name, prior.as_ref(), Some(&planned))
        .await;

    // whatever FMC confirmed is persisted before the error is reported
    state_file.save(response.state.as_ref())?;
    info!("State written to {}", state_file.path().display());

    print_diagnostics(&response.diagnostics);
    if response.has_errors() {
        bail!(
            "Apply of {} failed; partial state saved to {}",
            args.type_name,
            state_file.path().display()
        );
    }

    print_success(&format!("Applied {}", args.type_name));
    print_state(response.state.as_ref(), format);
    Ok(())
}
