//! Storage abstraction layer for topograph.
//!
//! This module provides the repository traits and their implementations:
//!
//! - [`GraphRepository`]: nodes, edges and projects
//! - [`StatusRepository`]: current operational status per node
//! - [`AuditLog`]: append-only audit trail
//!
//! [`SqliteStore`] implements all three. [`AuditingRepository`] and
//! [`LoggingRepository`] wrap any [`GraphRepository`] and implement it
//! themselves, so they can be stacked in either order:
//!
//! ```no_run
//! use topograph::domain::{Actor, Category, Node};
//! use topograph::storage::{AuditingRepository, GraphRepository, LoggingRepository, SqliteStore};
//!
//! # fn main() -> topograph::error::Result<()> {
//! let store = SqliteStore::open_in_memory()?;
//! let repo = LoggingRepository::new(AuditingRepository::new(&store, &store, Actor::system()));
//!
//! repo.insert_node(&Node::new("api", "Public API", Category::Application, "service"));
//! assert!(repo.node_exists(&"api".into()));
//! # Ok(())
//! # }
//! ```
//!
//! # Failure policy
//!
//! Reads never fail: a storage fault is logged and the read degrades to
//! `None`, `false` or an empty list so read paths stay available. Inserts of
//! nodes and edges degrade to `false` the same way. Every other write returns
//! `Result` and propagates storage faults to the caller.

use std::sync::Arc;

use crate::domain::{
    AuditRecord, Edge, EdgeId, EntityType, NewAuditRecord, Node, NodeId, NodeStatus, Project,
    ProjectId, StatusRecord,
};
use crate::error::Result;

mod audit;
mod logging;
pub mod sqlite;

pub use audit::{AuditingRepository, BULK_ENTITY_ID};
pub use logging::LoggingRepository;
pub use sqlite::SqliteStore;

/// Persistence interface for the graph: nodes, edges and projects.
///
/// The trait is object safe and takes `&self` everywhere, so one store can
/// be shared by reference between per-request decorator chains.
///
/// # Method Categories
///
/// - **Nodes**: `get_node`, `get_nodes`, `node_exists`, `insert_node`, `update_node`, `delete_node`
/// - **Edges**: the node operations plus `edge_exists_by_nodes`
/// - **Projects**: `get_project`, `get_projects`, `project_exists`, `insert_project`, `update_project`, `delete_project`
///
/// # Invariants
///
/// - Edge endpoints must reference existing nodes; the store enforces this
///   with a foreign key and cascades node deletes to their edges.
/// - At most one directed edge exists per unordered node pair:
///   `insert_edge` returns `false` when the reverse edge is present.
pub trait GraphRepository {
    // ========== Nodes ==========

    /// Get a node by id, `None` if absent.
    fn get_node(&self, id: &NodeId) -> Option<Node>;

    /// All nodes in insertion order.
    fn get_nodes(&self) -> Vec<Node>;

    /// Whether a node with this id exists.
    fn node_exists(&self, id: &NodeId) -> bool;

    /// Insert a node unless one with the same id already exists.
    ///
    /// Returns `true` when the statement ran, including when the id was
    /// already taken and nothing was written. Returns `false` on a storage
    /// fault.
    fn insert_node(&self, node: &Node) -> bool;

    /// Replace label, category, type and data of an existing node.
    ///
    /// Returns `Ok(false)` if no node has this id.
    ///
    /// # Errors
    ///
    /// Returns the storage fault if the update could not be executed.
    fn update_node(&self, node: &Node) -> Result<bool>;

    /// Delete a node and, through the foreign key, every edge touching it.
    ///
    /// # Errors
    ///
    /// Returns the storage fault if the delete could not be executed.
    fn delete_node(&self, id: &NodeId) -> Result<bool>;

    // ========== Edges ==========

    /// Get an edge by id, `None` if absent.
    fn get_edge(&self, id: &EdgeId) -> Option<Edge>;

    /// All edges in insertion order.
    fn get_edges(&self) -> Vec<Edge>;

    /// Whether an edge with this id exists.
    fn edge_exists(&self, id: &EdgeId) -> bool;

    /// Whether an edge `source -> target` exists (direction matters).
    fn edge_exists_by_nodes(&self, source: &NodeId, target: &NodeId) -> bool;

    /// Insert an edge unless it would duplicate an existing connection.
    ///
    /// Returns `false` without writing if `target -> source` already exists,
    /// if an endpoint does not exist, or on a storage fault.
    fn insert_edge(&self, edge: &Edge) -> bool;

    /// Replace the label and data of an existing edge. Endpoints are kept.
    ///
    /// # Errors
    ///
    /// Returns the storage fault if the update could not be executed.
    fn update_edge(&self, edge: &Edge) -> Result<bool>;

    /// Delete an edge.
    ///
    /// # Errors
    ///
    /// Returns the storage fault if the delete could not be executed.
    fn delete_edge(&self, id: &EdgeId) -> Result<bool>;

    // ========== Projects ==========

    /// Get a project by id, `None` if absent.
    fn get_project(&self, id: &ProjectId) -> Option<Project>;

    /// All projects in insertion order.
    fn get_projects(&self) -> Vec<Project>;

    /// Whether a project with this id exists.
    fn project_exists(&self, id: &ProjectId) -> bool;

    /// Insert a new project.
    ///
    /// # Errors
    ///
    /// Returns the storage fault, including a duplicate id.
    fn insert_project(&self, project: &Project) -> Result<bool>;

    /// Replace name, data and `updated_at` of an existing project.
    ///
    /// # Errors
    ///
    /// Returns the storage fault if the update could not be executed.
    fn update_project(&self, project: &Project) -> Result<bool>;

    /// Delete a project. Nodes and edges it lists are left alone.
    ///
    /// # Errors
    ///
    /// Returns the storage fault if the delete could not be executed.
    fn delete_project(&self, id: &ProjectId) -> Result<bool>;
}

/// Current-status store, one record per node id.
///
/// Status is independent of graph structure: a status can be written for a
/// node id that does not exist (yet).
pub trait StatusRepository {
    /// All current statuses.
    fn get_statuses(&self) -> Vec<StatusRecord>;

    /// Status of one node, `None` if never set.
    fn get_node_status(&self, id: &NodeId) -> Option<NodeStatus>;

    /// Set the status of a node, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns the storage fault if the write could not be executed.
    fn set_node_status(&self, id: &NodeId, status: NodeStatus) -> Result<()>;
}

/// Append-only audit trail.
pub trait AuditLog {
    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns the storage fault; callers in the decorator chain log and
    /// discard it.
    fn append(&self, record: &NewAuditRecord) -> Result<()>;

    /// The most recent `limit` records (all if `None`), oldest first.
    fn records(&self, limit: Option<usize>) -> Vec<AuditRecord>;
}

/// A repository call, as named in logs and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operation {
    GetNode,
    GetNodes,
    NodeExists,
    InsertNode,
    UpdateNode,
    DeleteNode,
    GetEdge,
    GetEdges,
    EdgeExists,
    EdgeExistsByNodes,
    InsertEdge,
    UpdateEdge,
    DeleteEdge,
    GetProject,
    GetProjects,
    ProjectExists,
    InsertProject,
    UpdateProject,
    DeleteProject,
}

impl Operation {
    /// The action name recorded in the audit trail.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetNode => "get_node",
            Self::GetNodes => "get_nodes",
            Self::NodeExists => "get_node_exists",
            Self::InsertNode => "insert_node",
            Self::UpdateNode => "update_node",
            Self::DeleteNode => "delete_node",
            Self::GetEdge => "get_edge",
            Self::GetEdges => "get_edges",
            Self::EdgeExists => "get_edge_exists",
            Self::EdgeExistsByNodes => "get_edge_exists_by_nodes",
            Self::InsertEdge => "insert_edge",
            Self::UpdateEdge => "update_edge",
            Self::DeleteEdge => "delete_edge",
            Self::GetProject => "get_project",
            Self::GetProjects => "get_projects",
            Self::ProjectExists => "get_project_exists",
            Self::InsertProject => "insert_project",
            Self::UpdateProject => "update_project",
            Self::DeleteProject => "delete_project",
        }
    }

    /// Kind of entity the operation touches.
    pub fn entity_type(self) -> EntityType {
        match self {
            Self::GetNode
            | Self::GetNodes
            | Self::NodeExists
            | Self::InsertNode
            | Self::UpdateNode
            | Self::DeleteNode => EntityType::Node,
            Self::GetEdge
            | Self::GetEdges
            | Self::EdgeExists
            | Self::EdgeExistsByNodes
            | Self::InsertEdge
            | Self::UpdateEdge
            | Self::DeleteEdge => EntityType::Edge,
            Self::GetProject
            | Self::GetProjects
            | Self::ProjectExists
            | Self::InsertProject
            | Self::UpdateProject
            | Self::DeleteProject => EntityType::Project,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Smart pointers to a repository are repositories, so decorators can wrap
// `&SqliteStore`, `Box<dyn GraphRepository>` or an `Arc` alike.
macro_rules! forward_graph_repository {
    ($($ptr:ty),+ $(,)?) => {$(
        impl<R: GraphRepository + ?Sized> GraphRepository for $ptr {
            fn get_node(&self, id: &NodeId) -> Option<Node> {
                (**self).get_node(id)
            }

            fn get_nodes(&self) -> Vec<Node> {
                (**self).get_nodes()
            }

            fn node_exists(&self, id: &NodeId) -> bool {
                (**self).node_exists(id)
            }

            fn insert_node(&self, node: &Node) -> bool {
                (**self).insert_node(node)
            }

            fn update_node(&self, node: &Node) -> Result<bool> {
                (**self).update_node(node)
            }

            fn delete_node(&self, id: &NodeId) -> Result<bool> {
                (**self).delete_node(id)
            }

            fn get_edge(&self, id: &EdgeId) -> Option<Edge> {
                (**self).get_edge(id)
            }

            fn get_edges(&self) -> Vec<Edge> {
                (**self).get_edges()
            }

            fn edge_exists(&self, id: &EdgeId) -> bool {
                (**self).edge_exists(id)
            }

            fn edge_exists_by_nodes(&self, source: &NodeId, target: &NodeId) -> bool {
                (**self).edge_exists_by_nodes(source, target)
            }

            fn insert_edge(&self, edge: &Edge) -> bool {
                (**self).insert_edge(edge)
            }

            fn update_edge(&self, edge: &Edge) -> Result<bool> {
                (**self).update_edge(edge)
            }

            fn delete_edge(&self, id: &EdgeId) -> Result<bool> {
                (**self).delete_edge(id)
            }

            fn get_project(&self, id: &ProjectId) -> Option<Project> {
                (**self).get_project(id)
            }

            fn get_projects(&self) -> Vec<Project> {
                (**self).get_projects()
            }

            fn project_exists(&self, id: &ProjectId) -> bool {
                (**self).project_exists(id)
            }

            fn insert_project(&self, project: &Project) -> Result<bool> {
                (**self).insert_project(project)
            }

            fn update_project(&self, project: &Project) -> Result<bool> {
                (**self).update_project(project)
            }

            fn delete_project(&self, id: &ProjectId) -> Result<bool> {
                (**self).delete_project(id)
            }
        }
    )+};
}

forward_graph_repository!(&R, Box<R>, Arc<R>);

impl<A: AuditLog + ?Sized> AuditLog for &A {
    fn append(&self, record: &NewAuditRecord) -> Result<()> {
        (**self).append(record)
    }

    fn records(&self, limit: Option<usize>) -> Vec<AuditRecord> {
        (**self).records(limit)
    }
}

impl<S: StatusRepository + ?Sized> StatusRepository for &S {
    fn get_statuses(&self) -> Vec<StatusRecord> {
        (**self).get_statuses()
    }

    fn get_node_status(&self, id: &NodeId) -> Option<NodeStatus> {
        (**self).get_node_status(id)
    }

    fn set_node_status(&self, id: &NodeId, status: NodeStatus) -> Result<()> {
        (**self).set_node_status(id, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    #[test]
    fn operation_names_follow_get_prefix_for_reads() {
        assert_eq!(Operation::NodeExists.as_str(), "get_node_exists");
        assert_eq!(Operation::EdgeExists.as_str(), "get_edge_exists");
        assert_eq!(Operation::UpdateProject.as_str(), "update_project");
    }

    #[test]
    fn operation_entity_types() {
        assert_eq!(Operation::EdgeExistsByNodes.entity_type(), EntityType::Edge);
        assert_eq!(Operation::DeleteProject.entity_type(), EntityType::Project);
        assert_eq!(Operation::GetNodes.entity_type(), EntityType::Node);
    }

    #[test]
    fn boxed_trait_object_is_a_repository() {
        let store = SqliteStore::open_in_memory().unwrap();
        let boxed: Box<dyn GraphRepository> = Box::new(store);

        assert!(boxed.insert_node(&Node::new("a", "A", Category::Business, "actor")));
        let by_ref: &dyn GraphRepository = &boxed;
        assert!(by_ref.node_exists(&NodeId::from("a")));
    }
}
