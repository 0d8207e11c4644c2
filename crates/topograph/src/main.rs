//! Topograph CLI binary.

use anyhow::Result;
use topograph::cli::Cli;
use topograph::commands::init::{
    CONFIG_FILE_NAME, DEFAULT_LOG_FILTER, TOPOGRAPH_DIR_NAME, TopographConfig, find_topograph_root,
};
use tracing_subscriber::EnvFilter;

/// Filter from the repository config, if there is one to read.
fn configured_log_filter() -> Option<String> {
    let cwd = std::env::current_dir().ok()?;
    let root = find_topograph_root(&cwd)?;
    let config = TopographConfig::load(&root.join(TOPOGRAPH_DIR_NAME).join(CONFIG_FILE_NAME)).ok()?;
    Some(config.log_filter)
}

fn main() -> Result<()> {
    // RUST_LOG wins over the config file, e.g. RUST_LOG=topograph::repository=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = configured_log_filter().unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting topograph CLI");

    let cli = Cli::parse_args();
    cli.execute()?;

    tracing::debug!("Topograph CLI completed successfully");
    Ok(())
}
