//! Refresh Command

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use fmc_provider::FmcProvider;

use super::check_type;
use crate::output::{print_diagnostics, print_state, print_success, OutputFormat};
use crate::state_file::StateFile;

#[derive(Args)]
pub struct RefreshArgs {
    /// Resource type, e.g. fmc_icmpv4_objects
    pub type_name: String,

    /// State file
    #[arg(short, long)]
    pub state: PathBuf,
}

pub async fn execute(args: RefreshArgs, provider: FmcProvider, format: OutputFormat) -> Result<()> {
    check_type(&args.type_name)?;

    let state_file = StateFile::new(&args.state);
    let Some(state) = state_file.load()? else {
        bail!("No state in {}", state_file.path().display());
    };

    let response = provider.read(&args.type_name, &state).await;
    print_diagnostics(&response.diagnostics);
    if response.has_errors() {
        bail!("Refresh of {} failed; state left untouched", args.type_name);
    }

    state_file.save(response.state.as_ref())?;
    print_success(&format!("Refreshed {}", state_file.path().display()));
    print_state(response.state.as_ref(), format);
    Ok(())
}
