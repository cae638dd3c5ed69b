//! KissKit command-line binary

fn main() -> anyhow::Result<()> {
    kisskit::cli::run_cli()
}
