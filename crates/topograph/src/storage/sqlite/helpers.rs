//! Helper functions for database row conversion and parsing.
//!
//! These utilities convert between database representations and domain types.
//! Also provides SQL column list constants to reduce duplication across query modules.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use serde::de::DeserializeOwned;

use crate::domain::{
    AuditRecord, Category, DataMap, Edge, Node, NodeStatus, Project, StatusRecord, UserId,
};

/// SQL column list for nodes table.
///
/// Use with `row_to_node` for consistent column ordering.
pub(crate) const NODES_COLUMNS: &str = "id, label, category, type, data";

/// SQL column list for edges table.
pub(crate) const EDGES_COLUMNS: &str = "id, source, target, data";

/// SQL column list for projects table.
pub(crate) const PROJECTS_COLUMNS: &str = "id, name, author, created_at, updated_at, data";

/// SQL column list for audit table.
pub(crate) const AUDIT_COLUMNS: &str =
    "id, entity_type, entity_id, action, old_data, new_data, user_id, ip_address, created_at";

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

/// Parse a JSON text column.
///
/// Returns an error for malformed JSON, indicating possible database corruption.
pub(crate) fn parse_json<T: DeserializeOwned>(column: usize, text: &str) -> rusqlite::Result<T> {
    serde_json::from_str(text)
        .map_err(|e| conversion_error(column, format!("Malformed JSON in column {column}: {e}")))
}

/// Format a timestamp for storage, keeping full sub-second precision.
pub(crate) fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_timestamp(column: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, format!("Invalid timestamp '{text}': {e}")))
}

/// Parse a category string from the database.
pub(crate) fn parse_category(column: usize, s: &str) -> rusqlite::Result<Category> {
    s.parse().map_err(|_| {
        conversion_error(
            column,
            format!("Unknown category '{s}' in database. Database may be corrupted or from a newer version."),
        )
    })
}

/// Parse a status string from the database.
pub(crate) fn parse_status(column: usize, s: &str) -> rusqlite::Result<NodeStatus> {
    s.parse().map_err(|_| {
        conversion_error(
            column,
            format!("Unknown status '{s}' in database. Database may be corrupted or from a newer version."),
        )
    })
}

/// Convert a row selected with [`NODES_COLUMNS`].
///
/// Id, label, category and type come from their columns; the attribute map
/// comes from the serialized entity in `data`.
pub(crate) fn row_to_node(row: &Row) -> rusqlite::Result<Node> {
    let category: String = row.get(2)?;
    let data: String = row.get(4)?;
    let stored: Node = parse_json(4, &data)?;

    Ok(Node {
        id: row.get::<_, String>(0)?.into(),
        label: row.get(1)?,
        category: parse_category(2, &category)?,
        node_type: row.get(3)?,
        data: stored.data,
    })
}

/// Convert a row selected with [`EDGES_COLUMNS`].
pub(crate) fn row_to_edge(row: &Row) -> rusqlite::Result<Edge> {
    let data: String = row.get(3)?;
    let stored: Edge = parse_json(3, &data)?;

    Ok(Edge {
        id: row.get::<_, String>(0)?.into(),
        source: row.get::<_, String>(1)?.into(),
        target: row.get::<_, String>(2)?.into(),
        label: stored.label,
        data: stored.data,
    })
}

/// Convert a row selected with [`PROJECTS_COLUMNS`].
pub(crate) fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;
    let data: String = row.get(5)?;

    Ok(Project {
        id: row.get::<_, String>(0)?.into(),
        name: row.get(1)?,
        author: UserId::from(row.get::<_, String>(2)?),
        created_at: parse_timestamp(3, &created_at)?,
        updated_at: parse_timestamp(4, &updated_at)?,
        data: parse_json(5, &data)?,
    })
}

/// Convert a `node_id, status` row.
pub(crate) fn row_to_status(row: &Row) -> rusqlite::Result<StatusRecord> {
    let status: String = row.get(1)?;
    Ok(StatusRecord {
        node_id: row.get::<_, String>(0)?.into(),
        status: parse_status(1, &status)?,
    })
}

/// Convert a row selected with [`AUDIT_COLUMNS`].
pub(crate) fn row_to_audit_record(row: &Row) -> rusqlite::Result<AuditRecord> {
    let old_data: Option<String> = row.get(4)?;
    let new_data: Option<String> = row.get(5)?;
    let created_at: String = row.get(8)?;

    Ok(AuditRecord {
        id: row.get(0)?,
        entity_type: row.get(1)?,
        entity_id: row.get(2)?,
        action: row.get(3)?,
        old_data: old_data
            .as_deref()
            .map(|text| parse_json::<DataMap>(4, text))
            .transpose()?,
        new_data: new_data
            .as_deref()
            .map(|text| parse_json::<DataMap>(5, text))
            .transpose()?,
        user_id: UserId::from(row.get::<_, String>(6)?),
        ip_address: row.get(7)?,
        created_at: parse_timestamp(8, &created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_category_rejects_unknown() {
        let err = parse_category(2, "cloud").unwrap_err();
        assert!(err.to_string().contains("cloud"));
    }

    #[test]
    fn parse_status_accepts_known() {
        assert_eq!(parse_status(1, "maintenance").unwrap(), NodeStatus::Maintenance);
    }

    #[test]
    fn parse_timestamp_normalizes_offset() {
        let t = parse_timestamp(0, "2026-03-01T12:00:00+02:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-03-01T10:00:00+00:00");
    }

    #[test]
    fn format_timestamp_round_trips_nanoseconds() {
        let t = Utc::now();
        assert_eq!(parse_timestamp(0, &format_timestamp(&t)).unwrap(), t);
    }

    #[test]
    fn parse_json_reports_column() {
        let err = parse_json::<DataMap>(4, "{not json").unwrap_err();
        assert!(err.to_string().contains("column 4"));
    }
}
