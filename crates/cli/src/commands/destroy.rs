//! Destroy Command

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use fmc_provider::FmcProvider;

use super::check_type;
use crate::output::{print_diagnostics, print_info, print_state, print_success, OutputFormat};
use crate::state_file::StateFile;

#[derive(Args)]
pub struct DestroyArgs {
    /// Resource type, e.g. fmc_icmpv4_objects
    pub type_name: String,

    /// State file
    #[arg(short, long)]
    pub state: PathBuf,
}

pub async fn execute(args: DestroyArgs, provider: FmcProvider, format: OutputFormat) -> Result<()> {
    check_type(&args.type_name)?;

    let state_file = StateFile::new(&args.state);
    let Some(prior) = state_file.load()? else {
        print_info("Nothing to destroy");
        return Ok(());
    };

    let response = provider.apply(&args.type_name, Some(&prior), None).await;
    state_file.save(response.state.as_ref())?;

    print_diagnostics(&response.diagnostics);
    if response.has_errors() {
        print_state(response.state.as_ref(), format);
        bail!(
            "Destroy of {} failed; remaining items kept in {}",
            args.type_name,
            state_file.path().display()
        );
    }

    print_success(&format!("Destroyed {}", args.type_name));
    Ok(())
}
