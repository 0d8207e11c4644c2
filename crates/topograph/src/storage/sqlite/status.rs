//! Node status storage.

use rusqlite::{OptionalExtension, params};

use super::helpers::{parse_status, row_to_status};
use super::{SqliteStore, degrade};
use crate::domain::{NodeId, NodeStatus, StatusRecord};
use crate::error::Result;
use crate::storage::StatusRepository;

impl SqliteStore {
    fn try_get_statuses(&self) -> Result<Vec<StatusRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT node_id, status FROM status ORDER BY rowid")?;

        let records = stmt
            .query_map([], row_to_status)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn try_get_node_status(&self, id: &NodeId) -> Result<Option<NodeStatus>> {
        let conn = self.connection()?;

        let status: Option<String> = conn
            .query_row(
                "SELECT status FROM status WHERE node_id = ?1",
                [id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(status.map(|s| parse_status(0, &s)).transpose()?)
    }
}

impl StatusRepository for SqliteStore {
    fn get_statuses(&self) -> Vec<StatusRecord> {
        degrade("get_statuses", self.try_get_statuses(), Vec::new())
    }

    fn get_node_status(&self, id: &NodeId) -> Option<NodeStatus> {
        degrade("get_node_status", self.try_get_node_status(id), None)
    }

    fn set_node_status(&self, id: &NodeId, status: NodeStatus) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "INSERT OR REPLACE INTO status (node_id, status, created_at) VALUES (?1, ?2, ?3)",
            params![id.as_str(), status.as_str(), Self::now()],
        )?;
        tracing::debug!(node_id = %id, %status, "Set node status");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::healthy(NodeStatus::Healthy)]
    #[case::unhealthy(NodeStatus::Unhealthy)]
    #[case::maintenance(NodeStatus::Maintenance)]
    #[case::unknown(NodeStatus::Unknown)]
    fn set_then_get(#[case] status: NodeStatus) {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = NodeId::from("db");

        store.set_node_status(&id, status).unwrap();
        assert_eq!(store.get_node_status(&id), Some(status));
    }

    #[test]
    fn setting_twice_replaces() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = NodeId::from("db");

        store.set_node_status(&id, NodeStatus::Healthy).unwrap();
        store.set_node_status(&id, NodeStatus::Maintenance).unwrap();

        assert_eq!(
            store.get_statuses(),
            vec![StatusRecord {
                node_id: id.clone(),
                status: NodeStatus::Maintenance,
            }]
        );
    }

    #[test]
    fn status_does_not_require_the_node() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = NodeId::from("not-yet-created");

        store.set_node_status(&id, NodeStatus::Unhealthy).unwrap();
        assert_eq!(store.get_node_status(&id), Some(NodeStatus::Unhealthy));
    }

    #[test]
    fn unset_status_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get_node_status(&NodeId::from("x")), None);
        assert!(store.get_statuses().is_empty());
    }
}
