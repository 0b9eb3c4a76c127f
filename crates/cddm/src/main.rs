//! CDDM CLI binary.

use anyhow::Result;
use cddm::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the cddm CLI.
///
/// Commands run one after another on a single thread, so the
/// current_thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=cddm=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cddm=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting cddm CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("cddm CLI completed successfully");
    Ok(())
}
