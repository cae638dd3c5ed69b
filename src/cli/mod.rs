//! KissKit CLI - Command-line interface for CM3D2 file format tools

pub mod commands;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "kisskit")]
#[command(about = "KissKit: CM3D2 file format tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the KissKit CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
