//! Import Command

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use fmc_provider::FmcProvider;

use super::check_type;
use crate::output::{print_diagnostics, print_state, print_success, OutputFormat};
use crate::state_file::StateFile;

#[derive(Args)]
pub struct ImportArgs {
    /// Resource type, e.g. fmc_icmpv4_objects
    pub type_name: String,

    /// Import id: [name1,name2] or Domain,[name1,name2]
    pub id: String,

    /// State file to create
    #[arg(short, long)]
    pub state: PathBuf,
}

pub async fn execute(args: ImportArgs, provider: FmcProvider, format: OutputFormat) -> Result<()> {
    check_type(&args.type_name)?;

    let state_file = StateFile::new(&args.state);
    if state_file.load()?.is_some() {
        bail!(
            "{} already holds state; refusing to overwrite it with an import",
            state_file.path().display()
        );
    }

    let response = provider.import(&args.type_name, &args.id).await;
    print_diagnostics(&response.diagnostics);
    if response.has_errors() {
        bail!("Import of {} failed", args.id);
    }

    state_file.save(response.state.as_ref())?;
    print_success(&format!("Imported {} into {}", args.id, state_file.path().display()));
    print_state(response.state.as_ref(), format);
    Ok(())
}
