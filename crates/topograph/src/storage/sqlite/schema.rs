//! Database schema definition.

/// Database schema definition.
///
/// `data` columns hold JSON text. For nodes and edges it is the whole entity
/// (id, label, category, type and the attribute map); the other columns
/// duplicate the fields that are queried.
pub(crate) const SCHEMA: &str = r"
-- Graph vertices
CREATE TABLE IF NOT EXISTS nodes (
    id TEXT PRIMARY KEY NOT NULL,
    label TEXT NOT NULL,
    category TEXT NOT NULL,
    type TEXT NOT NULL,
    data TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_nodes_category ON nodes(category);

-- Directed connections; deleting an endpoint deletes the edge
CREATE TABLE IF NOT EXISTS edges (
    id TEXT PRIMARY KEY NOT NULL,
    source TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    target TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    data TEXT NOT NULL,
    UNIQUE (source, target)
);

CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target);

-- Named views of the graph
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    author TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    data TEXT NOT NULL
);

-- Current status per node; no foreign key, status may precede the node
CREATE TABLE IF NOT EXISTS status (
    node_id TEXT PRIMARY KEY NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Append-only audit trail
CREATE TABLE IF NOT EXISTS audit (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_type TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    action TEXT NOT NULL,
    old_data TEXT,
    new_data TEXT,
    user_id TEXT NOT NULL,
    ip_address TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_entity ON audit(entity_type, entity_id);
";
