use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use posture_coach_cli::commands::Cli;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for reports
    let default_level = if cli.verbose() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level))
        )
        .with_writer(std::io::stderr)
        .init();

    // Initialize tokio runtime
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            cli.execute().await
        })
}
