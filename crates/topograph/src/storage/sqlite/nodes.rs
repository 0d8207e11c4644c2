//! Node CRUD operations.

use rusqlite::{OptionalExtension, params};

use super::helpers::{NODES_COLUMNS, row_to_node};
use super::SqliteStore;
use crate::domain::{Node, NodeId};
use crate::error::Result;

impl SqliteStore {
    pub(crate) fn try_get_node(&self, id: &NodeId) -> Result<Option<Node>> {
        let conn = self.connection()?;

        conn.query_row(
            &format!("SELECT {NODES_COLUMNS} FROM nodes WHERE id = ?1"),
            [id.as_str()],
            row_to_node,
        )
        .optional()
        .map_err(Into::into)
    }

    pub(crate) fn try_get_nodes(&self) -> Result<Vec<Node>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!("SELECT {NODES_COLUMNS} FROM nodes ORDER BY rowid"))?;

        let nodes = stmt
            .query_map([], row_to_node)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(nodes)
    }

    pub(crate) fn try_node_exists(&self, id: &NodeId) -> Result<bool> {
        let conn = self.connection()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM nodes WHERE id = ?1)",
            [id.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Insert-or-ignore: an existing row with the same id is left untouched.
    pub(crate) fn try_insert_node(&self, node: &Node) -> Result<()> {
        node.validate()?;
        let data = serde_json::to_string(node)?;
        let conn = self.connection()?;

        conn.execute(
            "INSERT OR IGNORE INTO nodes (id, label, category, type, data)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                node.id.as_str(),
                node.label,
                node.category.as_str(),
                node.node_type,
                data
            ],
        )?;
        Ok(())
    }

    pub(crate) fn try_update_node(&self, node: &Node) -> Result<bool> {
        let data = serde_json::to_string(node)?;
        let conn = self.connection()?;

        let changed = conn.execute(
            "UPDATE nodes SET label = ?2, category = ?3, type = ?4, data = ?5 WHERE id = ?1",
            params![
                node.id.as_str(),
                node.label,
                node.category.as_str(),
                node.node_type,
                data
            ],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn try_delete_node(&self, id: &NodeId) -> Result<bool> {
        let conn = self.connection()?;
        let deleted = conn.execute("DELETE FROM nodes WHERE id = ?1", [id.as_str()])?;
        Ok(deleted > 0)
    }
}
