//! Implementation of the `init` command and the configuration file.
//!
//! A topograph repository is a directory containing `.topograph/` with a
//! `config.yaml` and the `SQLite` database.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Actor;
use crate::error::{Error, Result};
use crate::storage::SqliteStore;

/// Name of the topograph directory
pub const TOPOGRAPH_DIR_NAME: &str = ".topograph";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the database file
pub const DATABASE_FILE_NAME: &str = "graph.db";

/// Name of the gitignore file within .topograph
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Default tracing filter when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "topograph=info";

/// Maximum directory depth to traverse when searching for the topograph root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure for topograph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TopographConfig {
    /// Database path, relative to the repository root unless absolute
    pub database: String,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Identity recorded in the audit trail for local commands
    #[serde(default)]
    pub actor: ActorConfig,

    /// Audit trail settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Wrap the repository in the tracing decorator
    #[serde(default)]
    pub trace_repository: bool,
}

/// Actor section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ActorConfig {
    /// User id written to audit records
    pub user_id: String,

    /// Address written to audit records
    pub ip_address: String,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            ip_address: "127.0.0.1".to_string(),
        }
    }
}

/// Audit section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditConfig {
    /// Record every repository call in the audit table
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl TopographConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Absolute database path for a repository rooted at `root`.
    pub fn database_path(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.database);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }

    /// The configured actor.
    pub fn actor(&self) -> Actor {
        Actor::new(self.actor.user_id.as_str(), self.actor.ip_address.as_str())
    }
}

impl Default for TopographConfig {
    fn default() -> Self {
        Self {
            database: format!("{TOPOGRAPH_DIR_NAME}/{DATABASE_FILE_NAME}"),
            log_filter: default_log_filter(),
            actor: ActorConfig::default(),
            audit: AuditConfig::default(),
            trace_repository: false,
        }
    }
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created topograph directory
    pub topograph_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created database
    pub database_file: PathBuf,
}

/// Initialize a new topograph repository in `base_dir`.
///
/// # Errors
///
/// Returns an error if `.topograph/` already exists or a file cannot be
/// created.
pub fn init(base_dir: &Path) -> Result<InitResult> {
    let topograph_dir = base_dir.join(TOPOGRAPH_DIR_NAME);

    if topograph_dir.exists() {
        return Err(Error::Config(format!(
            "Topograph is already initialized in this directory. Found existing '{TOPOGRAPH_DIR_NAME}'"
        )));
    }

    fs::create_dir_all(&topograph_dir)?;

    let config_file = topograph_dir.join(CONFIG_FILE_NAME);
    let config = TopographConfig::default();
    config.save(&config_file)?;

    // Opening creates the file and applies the schema
    let database_file = config.database_path(base_dir);
    SqliteStore::open(&database_file)?;

    let gitignore_file = topograph_dir.join(GITIGNORE_FILE_NAME);
    fs::write(
        &gitignore_file,
        "# SQLite write-ahead files\ngraph.db-wal\ngraph.db-shm\n",
    )?;

    tracing::debug!(dir = %topograph_dir.display(), "Initialized topograph repository");
    Ok(InitResult {
        topograph_dir,
        config_file,
        database_file,
    })
}

/// Check if a directory has been initialized with topograph.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TOPOGRAPH_DIR_NAME).exists()
}

/// Find the topograph root directory by searching up the directory tree.
///
/// Returns the directory containing `.topograph/`, or `None` if none is
/// found before the filesystem root or the depth limit.
pub fn find_topograph_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TOPOGRAPH_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_documented_layout() {
        let yaml = serde_yaml::to_string(&TopographConfig::default()).unwrap();

        assert!(yaml.contains("database: .topograph/graph.db"));
        assert!(yaml.contains("log-filter: topograph=info"));
        assert!(yaml.contains("user-id: local"));
        assert!(yaml.contains("ip-address:"));
        assert!(yaml.contains("enabled: true"));
        assert!(yaml.contains("trace-repository: false"));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: TopographConfig = serde_yaml::from_str("database: data/g.db\n").unwrap();

        assert_eq!(config.database, "data/g.db");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(config.audit.enabled);
        assert_eq!(config.actor(), Actor::new("local", "127.0.0.1"));
    }

    #[test]
    fn database_path_resolves_relative_to_root() {
        let config = TopographConfig::default();
        let root = Path::new("/work/repo");
        assert_eq!(
            config.database_path(root),
            PathBuf::from("/work/repo/.topograph/graph.db")
        );
    }

    #[test]
    fn init_creates_config_and_database() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path()).unwrap();

        assert!(result.topograph_dir.ends_with(TOPOGRAPH_DIR_NAME));
        assert!(result.config_file.exists());
        assert!(result.database_file.exists());
        assert!(temp_dir.path().join(TOPOGRAPH_DIR_NAME).join(GITIGNORE_FILE_NAME).exists());
        assert_eq!(
            TopographConfig::load(&result.config_file).unwrap(),
            TopographConfig::default()
        );
    }

    #[test]
    fn init_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path()).unwrap();

        let err = init(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("already initialized"));
    }

    #[test]
    fn find_root_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path()).unwrap();
        let nested = temp_dir.path().join("docs").join("diagrams");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_topograph_root(&nested), Some(temp_dir.path().to_path_buf()));
        assert!(is_initialized(temp_dir.path()));
        assert!(!is_initialized(&nested));
    }

    #[test]
    fn find_root_returns_none_when_absent() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(find_topograph_root(temp_dir.path()), None);
    }
}
