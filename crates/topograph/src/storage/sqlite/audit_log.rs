//! Audit trail storage.

use rusqlite::params;

use super::helpers::{AUDIT_COLUMNS, format_timestamp, row_to_audit_record};
use super::{SqliteStore, degrade};
use crate::domain::{AuditRecord, NewAuditRecord};
use crate::error::Result;
use crate::storage::AuditLog;

impl SqliteStore {
    fn try_records(&self, limit: Option<usize>) -> Result<Vec<AuditRecord>> {
        let conn = self.connection()?;
        // Newest `limit` rows, returned oldest first; -1 means no limit
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let mut stmt = conn.prepare(&format!(
            "SELECT {AUDIT_COLUMNS} FROM (SELECT * FROM audit ORDER BY id DESC LIMIT ?1) ORDER BY id"
        ))?;

        let records = stmt
            .query_map([limit], row_to_audit_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

impl AuditLog for SqliteStore {
    fn append(&self, record: &NewAuditRecord) -> Result<()> {
        let old_data = record.old_data.as_ref().map(serde_json::to_string).transpose()?;
        let new_data = record.new_data.as_ref().map(serde_json::to_string).transpose()?;
        let conn = self.connection()?;

        conn.execute(
            "INSERT INTO audit (entity_type, entity_id, action, old_data, new_data, user_id, ip_address, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.entity_type.as_str(),
                record.entity_id,
                record.action,
                old_data,
                new_data,
                record.actor.user_id.as_str(),
                record.actor.ip_address,
                format_timestamp(&record.created_at)
            ],
        )?;
        Ok(())
    }

    fn records(&self, limit: Option<usize>) -> Vec<AuditRecord> {
        degrade("audit_records", self.try_records(limit), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Actor, EntityType};
    use chrono::Utc;
    use serde_json::json;

    fn record(entity_id: &str, action: &'static str) -> NewAuditRecord {
        NewAuditRecord {
            entity_type: EntityType::Node,
            entity_id: entity_id.to_string(),
            action,
            old_data: None,
            new_data: json!({"id": entity_id}).as_object().cloned(),
            actor: Actor::new("alice", "10.0.0.7"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn append_then_read_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        let new = record("n1", "insert_node");
        store.append(&new).unwrap();

        let records = store.records(None);
        assert_eq!(records.len(), 1);
        let stored = &records[0];
        assert_eq!(stored.entity_type, "node");
        assert_eq!(stored.entity_id, "n1");
        assert_eq!(stored.action, "insert_node");
        assert_eq!(stored.old_data, None);
        assert_eq!(stored.new_data, new.new_data);
        assert_eq!(stored.user_id.as_str(), "alice");
        assert_eq!(stored.ip_address, "10.0.0.7");
        assert_eq!(stored.created_at, new.created_at);
    }

    #[test]
    fn limit_keeps_the_newest_in_ascending_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        for id in ["a", "b", "c", "d"] {
            store.append(&record(id, "get_node")).unwrap();
        }

        let ids: Vec<_> = store.records(Some(2)).into_iter().map(|r| r.entity_id).collect();
        assert_eq!(ids, vec!["c", "d"]);
        assert_eq!(store.records(None).len(), 4);
    }

    #[test]
    fn append_fails_without_the_table() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.execute_raw("DROP TABLE audit").unwrap();

        assert!(store.append(&record("n1", "insert_node")).is_err());
        assert!(store.records(None).is_empty());
    }
}
