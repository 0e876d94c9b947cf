//! FMC CLI - Main Entry Point
//!
//! Plans and applies bulk FMC object collections from JSON configuration,
//! keeping resource state in local files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod client;
mod commands;
mod output;
mod state_file;

use commands::{apply, destroy, import, plan, refresh, server, types};

/// FMC bulk object CLI
#[derive(Parser)]
#[command(name = "fmc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Provider config file (defaults to ~/.fmc/provider.toml)
    #[arg(long, global = true, env = "FMC_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported resource types
    Types,

    /// Show FMC version and bulk capabilities
    Server,

    /// Show what an apply would change
    Plan(plan::PlanArgs),

    /// Reconcile FMC with the desired configuration
    Apply(apply::ApplyArgs),

    /// Refresh a state file from FMC
    Refresh(refresh::RefreshArgs),

    /// Import existing FMC objects into a new state file
    Import(import::ImportArgs),

    /// Delete every object tracked in a state file
    Destroy(destroy::DestroyArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Types => types::execute(cli.format)?,
        Commands::Server => server::execute(client::connect(config).await?, cli.format)?,
        Commands::Plan(args) => plan::execute(args, cli.format)?,
        Commands::Apply(args) => apply::execute(args, client::connect(config).await?, cli.format).await?,
        Commands::Refresh(args) => refresh::execute(args, client::connect(config).await?, cli.format).await?,
        Commands::Import(args) => import::execute(args, client::connect(config).await?, cli.format).await?,
        Commands::Destroy(args) => destroy::execute(args, client::connect(config).await?, cli.format).await?,
    }

    Ok(())
}
