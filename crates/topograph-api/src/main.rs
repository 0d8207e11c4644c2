//! Topograph API server binary.
//!
//! Serves JSON-lines requests on stdin and answers on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use topograph::app::App;
use topograph::commands::init::{DEFAULT_LOG_FILTER, TopographConfig};
use topograph::storage::SqliteStore;
use topograph_api::{Controller, Server};
use tracing_subscriber::EnvFilter;

/// Serve topograph requests as JSON lines over stdio
#[derive(Parser, Debug)]
#[command(name = "topograph-api", version, about)]
struct Args {
    /// Database file to serve instead of the discovered repository
    #[arg(long)]
    database: Option<PathBuf>,
}

fn open_app(args: &Args) -> Result<App> {
    let cwd = std::env::current_dir()?;
    match &args.database {
        Some(path) => {
            let store = SqliteStore::open(path)
                .with_context(|| format!("Failed to open database {}", path.display()))?;
            Ok(App::new(store, TopographConfig::default(), cwd))
        }
        None => Ok(App::from_directory(&cwd)?),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let app = open_app(&args)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&app.config().log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(root = %app.root_dir().display(), "Starting topograph-api server");

    let server = Server::new(Controller::new(app));
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    server.run(stdin.lock(), stdout.lock())?;

    Ok(())
}
