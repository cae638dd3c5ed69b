use clap::Subcommand;
use std::path::PathBuf;

pub mod info;
pub mod roundtrip;

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect a .model or .menu file (format detected by magic)
    Info {
        /// Source file
        source: PathBuf,

        /// Dump the full document as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Decode a file and re-encode it, reporting whether the output is
    /// byte-identical
    Roundtrip {
        /// Source file
        source: PathBuf,

        /// Destination for the re-encoded file
        destination: PathBuf,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Info { source, json } => info::execute(source, *json),
            Commands::Roundtrip {
                source,
                destination,
            } => roundtrip::execute(source, destination),
        }
    }
}
