//! `SQLite` storage layer for topograph.
//!
//! `SQLite` is the source of truth for nodes, edges, projects, node status
//! and the audit trail. Graph algorithms run on views loaded from here.
//!
//! ## Module Structure
//!
//! - `schema` - Database schema (DDL)
//! - `helpers` - Row conversion and parsing utilities
//! - `nodes`, `edges`, `projects` - fallible CRUD used by the trait impls
//! - `status` - [`StatusRepository`](super::StatusRepository) impl
//! - `audit_log` - [`AuditLog`](super::AuditLog) impl
//! - `trait_impl` - [`GraphRepository`](super::GraphRepository) impl with the read/write failure policy

mod audit_log;
mod edges;
mod helpers;
mod nodes;
mod projects;
mod schema;
mod status;
mod trait_impl;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::Connection;

use crate::error::{Error, Result};
use schema::SCHEMA;

/// `SQLite` database wrapper implementing every repository trait.
///
/// The connection is wrapped in a `Mutex` so the store can be shared by
/// reference between decorator chains. Each repository call takes the lock
/// for the duration of its statements.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create the database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created, the file
    /// cannot be opened, or the schema cannot be applied.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::prepare(&conn)?;

        tracing::debug!(path = %path.display(), "Opened graph database");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database, mostly for tests and dry runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    fn prepare(conn: &Connection) -> Result<()> {
        // Cascading edge deletes depend on this being on for every connection
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Acquire the connection lock.
    pub(crate) fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            Error::Internal(format!(
                "database connection mutex poisoned (a thread panicked while holding the lock): {e}"
            ))
        })
    }

    /// Current time in the format stored in timestamp columns.
    pub(crate) fn now() -> String {
        helpers::format_timestamp(&Utc::now())
    }

    /// Run raw SQL against the connection; used by tests to break things.
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<()> {
        self.connection()?.execute_batch(sql)?;
        Ok(())
    }
}

/// Log a failed call and fall back to `fallback`.
pub(crate) fn degrade<T>(operation: &'static str, result: Result<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(operation, error = %e, "Storage call failed, returning fallback");
            fallback
        }
    }
}
