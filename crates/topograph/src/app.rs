//! Application context for CLI command execution.
//!
//! [`App`] owns the store and configuration and builds the repository
//! decorator chain for each command.
//!
//! # Example
//!
//! ```no_run
//! use topograph::app::App;
//! use topograph::storage::GraphRepository;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new("."))?;
//!     let nodes = app.repository().get_nodes();
//!     println!("{} nodes", nodes.len());
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::commands::init::{CONFIG_FILE_NAME, TOPOGRAPH_DIR_NAME, TopographConfig, find_topograph_root};
use crate::domain::Actor;
use crate::error::{Error, Result};
use crate::service::GraphService;
use crate::storage::{AuditingRepository, GraphRepository, LoggingRepository, SqliteStore};

/// Boxed decorator chain over the shared store.
pub type DynRepository<'a> = Box<dyn GraphRepository + 'a>;

/// Application context for CLI operations.
#[derive(Debug)]
pub struct App {
    store: SqliteStore,
    config: TopographConfig,
    root_dir: PathBuf,
}

impl App {
    /// Create an App from the given working directory.
    ///
    /// Searches up the directory tree for `.topograph/`, loads the
    /// configuration and opens the database.
    ///
    /// # Errors
    ///
    /// Returns an error if no repository is found, the configuration cannot
    /// be loaded, or the database cannot be opened.
    pub fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_topograph_root(working_dir).ok_or(Error::NotInitialized)?;
        let config = TopographConfig::load(&root_dir.join(TOPOGRAPH_DIR_NAME).join(CONFIG_FILE_NAME))?;
        let store = SqliteStore::open(&config.database_path(&root_dir))?;

        Ok(Self::new(store, config, root_dir))
    }

    /// Create an App around an already opened store.
    pub fn new(store: SqliteStore, config: TopographConfig, root_dir: PathBuf) -> Self {
        Self {
            store,
            config,
            root_dir,
        }
    }

    /// The repository chain for the configured local actor.
    pub fn repository(&self) -> DynRepository<'_> {
        self.repository_for(self.config.actor())
    }

    /// The repository chain recording calls on behalf of `actor`.
    ///
    /// Audit and tracing decorators are added according to the
    /// configuration; with both disabled this is the bare store.
    pub fn repository_for(&self, actor: Actor) -> DynRepository<'_> {
        build_repository(&self.store, &self.config, actor)
    }

    /// Service over [`Self::repository`].
    pub fn service(&self) -> GraphService<DynRepository<'_>> {
        GraphService::new(self.repository())
    }

    /// The store, for status and audit access.
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Loaded configuration.
    pub fn config(&self) -> &TopographConfig {
        &self.config
    }

    /// Directory that contains `.topograph/`.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}

/// Build the decorator chain over `store` as `config` asks for.
///
/// Order is tracing outermost, then audit, then the store.
pub fn build_repository<'a>(
    store: &'a SqliteStore,
    config: &TopographConfig,
    actor: Actor,
) -> DynRepository<'a> {
    match (config.audit.enabled, config.trace_repository) {
        (true, true) => Box::new(LoggingRepository::new(AuditingRepository::new(store, store, actor))),
        (true, false) => Box::new(AuditingRepository::new(store, store, actor)),
        (false, true) => Box::new(LoggingRepository::new(store)),
        (false, false) => Box::new(store),
    }
}
