//! Domain types for the graph backend.
//!
//! This module contains the entities the repositories store and return:
//! nodes, edges, projects, node status records and audit records, plus the
//! request-scoped [`Actor`] that audit records are attributed to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

mod project_id;

pub use project_id::{PROJECT_SUFFIX_LENGTH, slugify};

/// Open-ended attribute bag attached to nodes, edges and projects.
///
/// Insertion order is preserved through the JSON round-trip.
pub type DataMap = serde_json::Map<String, serde_json::Value>;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Unique, stable identifier of a node.
    NodeId
);
string_id!(
    /// Unique identifier of an edge.
    EdgeId
);
string_id!(
    /// Slug-plus-suffix identifier of a project.
    ProjectId
);
string_id!(
    /// Identity of the user a project or audit record belongs to.
    UserId
);

impl EdgeId {
    /// The id given to an edge created without one: `source--target`.
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("{source}--{target}"))
    }
}

fn ensure_id(field: &'static str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::invalid(field, id, "a non-empty identifier"));
    }
    Ok(())
}

// ========== Node ==========

/// Architectural layer a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Business capabilities, processes and actors.
    Business,
    /// Applications, services and data stores.
    Application,
    /// Servers, networks and other runtime infrastructure.
    Infrastructure,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 3] = [
        Category::Business,
        Category::Application,
        Category::Infrastructure,
    ];

    const VALID: &'static str = "business, application, infrastructure";

    /// Storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Application => "application",
            Self::Infrastructure => "infrastructure",
        }
    }

    /// Node types conventionally used with this category.
    ///
    /// Types are free-form; this registry only feeds pickers and hints.
    pub fn conventional_types(self) -> &'static [&'static str] {
        match self {
            Self::Business => &["actor", "process", "capability", "product"],
            Self::Application => &["service", "database", "queue", "frontend"],
            Self::Infrastructure => &["server", "container", "network", "storage"],
        }
    }

    /// Whether `node_type` is in this category's registry.
    pub fn is_conventional_type(self, node_type: &str) -> bool {
        self.conventional_types().contains(&node_type)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "business" => Ok(Self::Business),
            "application" => Ok(Self::Application),
            "infrastructure" => Ok(Self::Infrastructure),
            other => Err(Error::invalid("category", other, Self::VALID)),
        }
    }
}

/// A vertex of the edited graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,

    /// Display label
    pub label: String,

    /// Architectural layer
    pub category: Category,

    /// Free-form type, conventionally from [`Category::conventional_types`]
    #[serde(rename = "type")]
    pub node_type: String,

    /// Presentation and business attributes
    #[serde(default)]
    pub data: DataMap,
}

impl Node {
    /// Create a node with an empty data map.
    pub fn new(
        id: impl Into<NodeId>,
        label: impl Into<String>,
        category: Category,
        node_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category,
            node_type: node_type.into(),
            data: DataMap::new(),
        }
    }

    /// Replace the data map.
    #[must_use]
    pub fn with_data(mut self, data: DataMap) -> Self {
        self.data = data;
        self
    }

    /// Check the fields the store cannot check for us.
    pub fn validate(&self) -> Result<()> {
        ensure_id("node id", self.id.as_str())
    }
}

// ========== Edge ==========

/// A directed connection between two nodes.
///
/// Endpoints are fixed once the edge exists; updates only touch
/// `label` and `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier
    pub id: EdgeId,

    /// Node the edge starts from
    pub source: NodeId,

    /// Node the edge points to
    pub target: NodeId,

    /// Display label
    #[serde(default)]
    pub label: String,

    /// Presentation attributes
    #[serde(default)]
    pub data: DataMap,
}

impl Edge {
    /// Create an unlabelled edge with an empty data map.
    pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: String::new(),
            data: DataMap::new(),
        }
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replace the data map.
    #[must_use]
    pub fn with_data(mut self, data: DataMap) -> Self {
        self.data = data;
        self
    }

    /// Check the id and both endpoints are non-empty.
    pub fn validate(&self) -> Result<()> {
        ensure_id("edge id", self.id.as_str())?;
        ensure_id("source", self.source.as_str())?;
        ensure_id("target", self.target.as_str())
    }
}

// ========== Project ==========

/// A named, author-owned view of the graph with arbitrary metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Slug-plus-suffix identifier, see [`ProjectId::generate`]
    pub id: ProjectId,

    /// Display name
    pub name: String,

    /// User who created the project
    pub author: UserId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,

    /// Arbitrary metadata, including `nodes` / `edges` membership lists
    #[serde(default)]
    pub data: DataMap,
}

impl Project {
    /// Create a project with a freshly generated id and both timestamps set to now.
    pub fn new(name: impl Into<String>, author: impl Into<UserId>, data: DataMap) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: ProjectId::generate(&name),
            name,
            author: author.into(),
            created_at: now,
            updated_at: now,
            data,
        }
    }

    /// Node ids listed in `data.nodes`.
    ///
    /// Entries may be plain strings or objects carrying an `id` field;
    /// anything else is ignored.
    pub fn member_nodes(&self) -> Vec<NodeId> {
        member_ids(&self.data, "nodes").map(NodeId::from).collect()
    }

    /// Edge ids listed in `data.edges`, same rules as [`Self::member_nodes`].
    pub fn member_edges(&self) -> Vec<EdgeId> {
        member_ids(&self.data, "edges").map(EdgeId::from).collect()
    }

    /// Check the name is usable.
    pub fn validate(&self) -> Result<()> {
        ensure_id("project id", self.id.as_str())?;
        if self.name.trim().is_empty() {
            return Err(Error::invalid("name", &self.name, "a non-empty project name"));
        }
        Ok(())
    }
}

fn member_ids<'a>(data: &'a DataMap, key: &str) -> impl Iterator<Item = &'a str> + 'a {
    data.get(key)
        .and_then(serde_json::Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| match entry {
            serde_json::Value::String(id) => Some(id.as_str()),
            serde_json::Value::Object(obj) => obj.get("id").and_then(serde_json::Value::as_str),
            _ => None,
        })
}

// ========== Status ==========

/// Operational health of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// No health information yet
    #[default]
    Unknown,
    /// Operating normally
    Healthy,
    /// Degraded or down
    Unhealthy,
    /// Deliberately taken out of service
    Maintenance,
}

impl NodeStatus {
    /// Every status value.
    pub const ALL: [NodeStatus; 4] = [
        NodeStatus::Unknown,
        NodeStatus::Healthy,
        NodeStatus::Unhealthy,
        NodeStatus::Maintenance,
    ];

    const VALID: &'static str = "unknown, healthy, unhealthy, maintenance";

    /// Storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "healthy" => Ok(Self::Healthy),
            "unhealthy" => Ok(Self::Unhealthy),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(Error::invalid("status", other, Self::VALID)),
        }
    }
}

/// Current status of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Node the status belongs to (not required to exist)
    pub node_id: NodeId,

    /// Current status
    pub status: NodeStatus,
}

// ========== Audit ==========

/// Who is performing the current request.
///
/// Handed to the audit decorator per request; the core never
/// authenticates, it only records what it is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Acting user
    pub user_id: UserId,

    /// Address the request came from
    pub ip_address: String,
}

impl Actor {
    /// Create an actor.
    pub fn new(user_id: impl Into<UserId>, ip_address: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ip_address: ip_address.into(),
        }
    }

    /// The actor used for work the process does on its own behalf.
    pub fn system() -> Self {
        Self::new("system", "127.0.0.1")
    }
}

/// Kind of entity an audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A graph node
    Node,
    /// A graph edge
    Edge,
    /// A project
    Project,
}

impl EntityType {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit entry waiting to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditRecord {
    /// Kind of entity touched
    pub entity_type: EntityType,
    /// Identifier of the entity, `*` for bulk reads
    pub entity_id: String,
    /// Repository operation, e.g. `update_node`
    pub action: &'static str,
    /// Value before the call, for updates and deletes
    pub old_data: Option<DataMap>,
    /// Value after the call, for inserts and updates
    pub new_data: Option<DataMap>,
    /// Who made the call
    pub actor: Actor,
    /// When the call completed
    pub created_at: DateTime<Utc>,
}

/// A persisted, immutable audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Autoincrement row id
    pub id: i64,
    /// Kind of entity touched
    pub entity_type: String,
    /// Identifier of the entity
    pub entity_id: String,
    /// Repository operation
    pub action: String,
    /// Value before the call
    pub old_data: Option<DataMap>,
    /// Value after the call
    pub new_data: Option<DataMap>,
    /// Acting user
    pub user_id: UserId,
    /// Address the call came from
    pub ip_address: String,
    /// When the call completed
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::business("business", Category::Business)]
    #[case::application("application", Category::Application)]
    #[case::infrastructure("infrastructure", Category::Infrastructure)]
    fn category_parses_known_values(#[case] input: &str, #[case] expected: Category) {
        assert_eq!(input.parse::<Category>().unwrap(), expected);
        assert_eq!(expected.as_str(), input);
    }

    #[rstest]
    #[case::capitalized("Business")]
    #[case::empty("")]
    #[case::unknown("cloud")]
    fn category_rejects_unknown_values(#[case] input: &str) {
        let err = input.parse::<Category>().unwrap_err();
        assert!(matches!(err, Error::InvalidValue { field: "category", .. }));
    }

    #[test]
    fn status_rejects_unknown_values() {
        let err = "degraded".parse::<NodeStatus>().unwrap_err();
        assert!(err.to_string().contains("maintenance"));
        assert_eq!(NodeStatus::default(), NodeStatus::Unknown);
    }

    #[test]
    fn conventional_types_are_per_category() {
        assert!(Category::Application.is_conventional_type("database"));
        assert!(!Category::Business.is_conventional_type("database"));
    }

    #[test]
    fn node_serializes_type_field() {
        let node = Node::new("n1", "Billing", Category::Application, "service");
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["type"], "service");
        assert_eq!(value["category"], "application");
        assert_eq!(value["id"], "n1");
    }

    #[test]
    fn blank_ids_fail_validation() {
        assert!(Node::new("  ", "x", Category::Business, "actor").validate().is_err());
        assert!(Edge::new("e1", "a", "").validate().is_err());
        assert!(Edge::new("e1", "a", "b").validate().is_ok());
        assert_eq!(EdgeId::between(&"a".into(), &"b".into()).as_str(), "a--b");
    }

    #[test]
    fn project_members_accept_strings_and_objects() {
        let data = json!({
            "nodes": ["a", {"id": "b"}, 7, {"name": "no id"}],
            "edges": [{"id": "e1"}]
        });
        let project = Project::new(
            "Checkout",
            "alice",
            data.as_object().cloned().unwrap_or_default(),
        );

        assert_eq!(project.member_nodes(), vec![NodeId::from("a"), NodeId::from("b")]);
        assert_eq!(project.member_edges(), vec![EdgeId::from("e1")]);
    }

    #[test]
    fn project_without_membership_lists_has_no_members() {
        let project = Project::new("Empty", "alice", DataMap::new());
        assert!(project.member_nodes().is_empty());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn data_map_keeps_insertion_order() {
        let mut data = DataMap::new();
        data.insert("zeta".into(), json!(1));
        data.insert("alpha".into(), json!(2));

        let text = serde_json::to_string(&data).unwrap();
        let back: DataMap = serde_json::from_str(&text).unwrap();
        let keys: Vec<_> = back.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
