//! Service layer over a [`GraphRepository`].
//!
//! Mostly pass-through; adds project creation, timestamp handling and the
//! graph-level reads (traversal, project subgraphs) that need more than one
//! repository call.

use chrono::Utc;
use serde::Serialize;

use crate::domain::{DataMap, Edge, EdgeId, Node, NodeId, Project, ProjectId, UserId};
use crate::error::Result;
use crate::storage::GraphRepository;
use crate::traversal::{self, GraphView};

/// Nodes and edges that belong to one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectGraph {
    /// The project itself
    pub project: Project,
    /// Member nodes that exist, in `data.nodes` order
    pub nodes: Vec<Node>,
    /// Edges whose endpoints are both members
    pub edges: Vec<Edge>,
}

/// Graph operations on top of any repository or decorator chain.
#[derive(Debug)]
pub struct GraphService<R> {
    repo: R,
}

impl<R: GraphRepository> GraphService<R> {
    /// Create a service over `repo`.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    // ========== Nodes ==========

    /// Get a node by id.
    pub fn node(&self, id: &NodeId) -> Option<Node> {
        self.repo.get_node(id)
    }

    /// All nodes.
    pub fn nodes(&self) -> Vec<Node> {
        self.repo.get_nodes()
    }

    /// Whether a node exists.
    pub fn node_exists(&self, id: &NodeId) -> bool {
        self.repo.node_exists(id)
    }

    /// Insert a node; see [`GraphRepository::insert_node`].
    pub fn add_node(&self, node: &Node) -> bool {
        self.repo.insert_node(node)
    }

    /// Update a node.
    ///
    /// # Errors
    ///
    /// Returns the storage fault from the repository.
    pub fn update_node(&self, node: &Node) -> Result<bool> {
        self.repo.update_node(node)
    }

    /// Delete a node and its edges.
    ///
    /// # Errors
    ///
    /// Returns the storage fault from the repository.
    pub fn delete_node(&self, id: &NodeId) -> Result<bool> {
        self.repo.delete_node(id)
    }

    // ========== Edges ==========

    /// Get an edge by id.
    pub fn edge(&self, id: &EdgeId) -> Option<Edge> {
        self.repo.get_edge(id)
    }

    /// All edges.
    pub fn edges(&self) -> Vec<Edge> {
        self.repo.get_edges()
    }

    /// Whether an edge exists.
    pub fn edge_exists(&self, id: &EdgeId) -> bool {
        self.repo.edge_exists(id)
    }

    /// Whether `source -> target` exists.
    pub fn edge_exists_between(&self, source: &NodeId, target: &NodeId) -> bool {
        self.repo.edge_exists_by_nodes(source, target)
    }

    /// Insert an edge; `false` on a reverse-edge conflict or a missing endpoint.
    pub fn add_edge(&self, edge: &Edge) -> bool {
        self.repo.insert_edge(edge)
    }

    /// Update an edge's label and data.
    ///
    /// # Errors
    ///
    /// Returns the storage fault from the repository.
    pub fn update_edge(&self, edge: &Edge) -> Result<bool> {
        self.repo.update_edge(edge)
    }

    /// Delete an edge.
    ///
    /// # Errors
    ///
    /// Returns the storage fault from the repository.
    pub fn delete_edge(&self, id: &EdgeId) -> Result<bool> {
        self.repo.delete_edge(id)
    }

    // ========== Projects ==========

    /// Get a project by id.
    pub fn project(&self, id: &ProjectId) -> Option<Project> {
        self.repo.get_project(id)
    }

    /// All projects.
    pub fn projects(&self) -> Vec<Project> {
        self.repo.get_projects()
    }

    /// Whether a project exists.
    pub fn project_exists(&self, id: &ProjectId) -> bool {
        self.repo.project_exists(id)
    }

    /// Create a project with a generated id and fresh timestamps.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or the storage fault.
    pub fn create_project(
        &self,
        name: &str,
        author: impl Into<UserId>,
        data: DataMap,
    ) -> Result<Project> {
        let project = Project::new(name, author, data);
        self.repo.insert_project(&project)?;
        tracing::info!(id = %project.id, name = %project.name, "Created project");
        Ok(project)
    }

    /// Save name and data of `project`, bumping `updated_at`.
    ///
    /// Returns the stored project, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or the storage fault.
    pub fn update_project(&self, project: &Project) -> Result<Option<Project>> {
        project.validate()?;
        let mut updated = project.clone();
        updated.updated_at = Utc::now();

        if self.repo.update_project(&updated)? {
            Ok(self.repo.get_project(&updated.id))
        } else {
            Ok(None)
        }
    }

    /// Rename a project.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or the storage fault.
    pub fn rename_project(&self, id: &ProjectId, name: &str) -> Result<Option<Project>> {
        let Some(mut project) = self.repo.get_project(id) else {
            return Ok(None);
        };
        project.name = name.to_string();
        self.update_project(&project)
    }

    /// Delete a project; its member nodes and edges stay.
    ///
    /// # Errors
    ///
    /// Returns the storage fault from the repository.
    pub fn delete_project(&self, id: &ProjectId) -> Result<bool> {
        self.repo.delete_project(id)
    }

    // ========== Graph ==========

    /// Nodes reachable from `start`, breadth-first.
    pub fn traverse(&self, start: &NodeId) -> Vec<Node> {
        let view = GraphView::load(&self.repo);
        traversal::reachable(&view, start)
    }

    /// The subgraph listed in a project's `data.nodes`.
    ///
    /// Listed ids that no longer exist are skipped. Returns `None` if the
    /// project does not exist.
    pub fn project_graph(&self, id: &ProjectId) -> Option<ProjectGraph> {
        let project = self.repo.get_project(id)?;
        let members = project.member_nodes();

        let mut nodes: Vec<Node> = self
            .repo
            .get_nodes()
            .into_iter()
            .filter(|n| members.contains(&n.id))
            .collect();
        nodes.sort_by_key(|n| members.iter().position(|m| *m == n.id));

        let edges = self
            .repo
            .get_edges()
            .into_iter()
            .filter(|e| members.contains(&e.source) && members.contains(&e.target))
            .collect();

        Some(ProjectGraph {
            project,
            nodes,
            edges,
        })
    }
}
