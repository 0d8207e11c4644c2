//! Edge CRUD operations.

use rusqlite::{OptionalExtension, params};

use super::helpers::{EDGES_COLUMNS, row_to_edge};
use super::SqliteStore;
use crate::domain::{Edge, EdgeId, NodeId};
use crate::error::Result;

impl SqliteStore {
    pub(crate) fn try_get_edge(&self, id: &EdgeId) -> Result<Option<Edge>> {
        let conn = self.connection()?;

        conn.query_row(
            &format!("SELECT {EDGES_COLUMNS} FROM edges WHERE id = ?1"),
            [id.as_str()],
            row_to_edge,
        )
        .optional()
        .map_err(Into::into)
    }

    pub(crate) fn try_get_edges(&self) -> Result<Vec<Edge>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {EDGES_COLUMNS} FROM edges ORDER BY rowid"))?;

        let edges = stmt
            .query_map([], row_to_edge)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    pub(crate) fn try_edge_exists(&self, id: &EdgeId) -> Result<bool> {
        let conn = self.connection()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM edges WHERE id = ?1)",
            [id.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub(crate) fn try_edge_exists_by_nodes(&self, source: &NodeId, target: &NodeId) -> Result<bool> {
        let conn = self.connection()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM edges WHERE source = ?1 AND target = ?2)",
            params![source.as_str(), target.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Insert an edge; `Ok(false)` if the reverse edge already exists.
    ///
    /// The reverse check and the insert run under one lock so no other
    /// caller on this store can slip the reverse edge in between.
    pub(crate) fn try_insert_edge(&self, edge: &Edge) -> Result<bool> {
        edge.validate()?;
        let data = serde_json::to_string(edge)?;
        let conn = self.connection()?;

        let reverse_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM edges WHERE source = ?1 AND target = ?2)",
            params![edge.target.as_str(), edge.source.as_str()],
            |row| row.get(0),
        )?;
        // An existing self-loop is its own reverse
        if reverse_exists {
            tracing::debug!(
                source = %edge.source,
                target = %edge.target,
                "Rejected edge: reverse connection already exists"
            );
            return Ok(false);
        }

        // OR IGNORE covers duplicate ids and duplicate (source, target) pairs;
        // a missing endpoint still fails the foreign key.
        conn.execute(
            "INSERT OR IGNORE INTO edges (id, source, target, data) VALUES (?1, ?2, ?3, ?4)",
            params![edge.id.as_str(), edge.source.as_str(), edge.target.as_str(), data],
        )?;
        Ok(true)
    }

    /// Update label and data, keeping the stored endpoints.
    pub(crate) fn try_update_edge(&self, edge: &Edge) -> Result<bool> {
        let conn = self.connection()?;

        let Some(current) = conn
            .query_row(
                &format!("SELECT {EDGES_COLUMNS} FROM edges WHERE id = ?1"),
                [edge.id.as_str()],
                row_to_edge,
            )
            .optional()?
        else {
            return Ok(false);
        };

        if current.source != edge.source || current.target != edge.target {
            tracing::debug!(
                id = %edge.id,
                "Ignoring endpoint change on edge update"
            );
        }

        let updated = Edge {
            label: edge.label.clone(),
            data: edge.data.clone(),
            ..current
        };
        let data = serde_json::to_string(&updated)?;

        let changed = conn.execute(
            "UPDATE edges SET data = ?2 WHERE id = ?1",
            params![updated.id.as_str(), data],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn try_delete_edge(&self, id: &EdgeId) -> Result<bool> {
        let conn = self.connection()?;
        let deleted = conn.execute("DELETE FROM edges WHERE id = ?1", [id.as_str()])?;
        Ok(deleted > 0)
    }
}
