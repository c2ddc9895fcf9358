//! Supply-chain navigator CLI binary.

use anyhow::Result;
use supplychain::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the supplychain CLI.
///
/// The current-thread runtime is enough: fetches are I/O bound and the
/// navigator runtime interleaves them on one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output on stdout stays parseable.
    // Example: RUST_LOG=supplychain=debug supplychain explore
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("supplychain=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting supplychain CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Supplychain CLI completed successfully");
    Ok(())
}
