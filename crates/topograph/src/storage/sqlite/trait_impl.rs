//! `GraphRepository` implementation for `SqliteStore`.
//!
//! Reads and node/edge inserts degrade to an empty answer on failure;
//! the remaining writes pass the error through.

use super::{SqliteStore, degrade};
use crate::domain::{Edge, EdgeId, Node, NodeId, Project, ProjectId};
use crate::error::Result;
use crate::storage::GraphRepository;

impl GraphRepository for SqliteStore {
    // ========== Nodes ==========

    fn get_node(&self, id: &NodeId) -> Option<Node> {
        degrade("get_node", self.try_get_node(id), None)
    }

    fn get_nodes(&self) -> Vec<Node> {
        degrade("get_nodes", self.try_get_nodes(), Vec::new())
    }

    fn node_exists(&self, id: &NodeId) -> bool {
        degrade("get_node_exists", self.try_node_exists(id), false)
    }

    fn insert_node(&self, node: &Node) -> bool {
        degrade("insert_node", self.try_insert_node(node).map(|()| true), false)
    }

    fn update_node(&self, node: &Node) -> Result<bool> {
        self.try_update_node(node)
    }

    fn delete_node(&self, id: &NodeId) -> Result<bool> {
        self.try_delete_node(id)
    }

    // ========== Edges ==========

    fn get_edge(&self, id: &EdgeId) -> Option<Edge> {
        degrade("get_edge", self.try_get_edge(id), None)
    }

    fn get_edges(&self) -> Vec<Edge> {
        degrade("get_edges", self.try_get_edges(), Vec::new())
    }

    fn edge_exists(&self, id: &EdgeId) -> bool {
        degrade("get_edge_exists", self.try_edge_exists(id), false)
    }

    fn edge_exists_by_nodes(&self, source: &NodeId, target: &NodeId) -> bool {
        degrade(
            "get_edge_exists_by_nodes",
            self.try_edge_exists_by_nodes(source, target),
            false,
        )
    }

    fn insert_edge(&self, edge: &Edge) -> bool {
        degrade("insert_edge", self.try_insert_edge(edge), false)
    }

    fn update_edge(&self, edge: &Edge) -> Result<bool> {
        self.try_update_edge(edge)
    }

    fn delete_edge(&self, id: &EdgeId) -> Result<bool> {
        self.try_delete_edge(id)
    }

    // ========== Projects ==========

    fn get_project(&self, id: &ProjectId) -> Option<Project> {
        degrade("get_project", self.try_get_project(id), None)
    }

    fn get_projects(&self) -> Vec<Project> {
        degrade("get_projects", self.try_get_projects(), Vec::new())
    }

    fn project_exists(&self, id: &ProjectId) -> bool {
        degrade("get_project_exists", self.try_project_exists(id), false)
    }

    fn insert_project(&self, project: &Project) -> Result<bool> {
        self.try_insert_project(project)
    }

    fn update_project(&self, project: &Project) -> Result<bool> {
        self.try_update_project(project)
    }

    fn delete_project(&self, id: &ProjectId) -> Result<bool> {
        self.try_delete_project(id)
    }
}
