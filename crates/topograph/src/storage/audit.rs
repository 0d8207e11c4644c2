//! Audit decorator.
//!
//! [`AuditingRepository`] wraps a [`GraphRepository`] and appends one audit
//! record to an [`AuditLog`] for every call that reaches the wrapped
//! repository, reads included.

use chrono::Utc;
use serde::Serialize;

use super::{AuditLog, GraphRepository, Operation};
use crate::domain::{Actor, DataMap, Edge, EdgeId, NewAuditRecord, Node, NodeId, Project, ProjectId};
use crate::error::Result;

/// Entity id recorded for calls that read a whole collection.
pub const BULK_ENTITY_ID: &str = "*";

/// Repository decorator that records every call in an audit log.
///
/// Updates and deletes read the previous value from the wrapped repository
/// first, so the record carries `old_data`. That read is not transactional
/// with the write and may be stale under concurrent writers.
///
/// Appending is best-effort: a failed append is logged and the delegated
/// result is returned unchanged. A write that fails with `Err` is not
/// recorded.
#[derive(Debug)]
pub struct AuditingRepository<R, A> {
    inner: R,
    audit_log: A,
    actor: Actor,
}

impl<R, A> AuditingRepository<R, A>
where
    R: GraphRepository,
    A: AuditLog,
{
    /// Wrap `inner`, recording calls made on behalf of `actor` into `audit_log`.
    pub fn new(inner: R, audit_log: A, actor: Actor) -> Self {
        Self {
            inner,
            audit_log,
            actor,
        }
    }

    /// The actor recorded on every entry.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// The wrapped repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn record(
        &self,
        operation: Operation,
        entity_id: &str,
        old_data: Option<DataMap>,
        new_data: Option<DataMap>,
    ) {
        let record = NewAuditRecord {
            entity_type: operation.entity_type(),
            entity_id: entity_id.to_string(),
            action: operation.as_str(),
            old_data,
            new_data,
            actor: self.actor.clone(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.audit_log.append(&record) {
            tracing::warn!(
                action = operation.as_str(),
                entity_id,
                error = %e,
                "Failed to append audit record"
            );
        }
    }

    fn record_write(
        &self,
        operation: Operation,
        entity_id: &str,
        old_data: Option<DataMap>,
        new_data: Option<DataMap>,
        result: Result<bool>,
    ) -> Result<bool> {
        let changed = result?;
        self.record(operation, entity_id, old_data, new_data);
        Ok(changed)
    }
}

/// Serialize an entity into the map stored in `old_data` / `new_data`.
fn snapshot<T: Serialize>(entity: &T) -> Option<DataMap> {
    match serde_json::to_value(entity) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to snapshot entity for audit");
            None
        }
    }
}

impl<R, A> GraphRepository for AuditingRepository<R, A>
where
    R: GraphRepository,
    A: AuditLog,
{
    // ========== Nodes ==========

    fn get_node(&self, id: &NodeId) -> Option<Node> {
        let node = self.inner.get_node(id);
        self.record(Operation::GetNode, id.as_str(), None, None);
        node
    }

    fn get_nodes(&self) -> Vec<Node> {
        let nodes = self.inner.get_nodes();
        self.record(Operation::GetNodes, BULK_ENTITY_ID, None, None);
        nodes
    }

    fn node_exists(&self, id: &NodeId) -> bool {
        let exists = self.inner.node_exists(id);
        self.record(Operation::NodeExists, id.as_str(), None, None);
        exists
    }

    fn insert_node(&self, node: &Node) -> bool {
        let inserted = self.inner.insert_node(node);
        self.record(Operation::InsertNode, node.id.as_str(), None, snapshot(node));
        inserted
    }

    fn update_node(&self, node: &Node) -> Result<bool> {
        let old = self.inner.get_node(&node.id);
        let result = self.inner.update_node(node);
        self.record_write(
            Operation::UpdateNode,
            node.id.as_str(),
            old.as_ref().and_then(snapshot),
            snapshot(node),
            result,
        )
    }

    fn delete_node(&self, id: &NodeId) -> Result<bool> {
        let old = self.inner.get_node(id);
        let result = self.inner.delete_node(id);
        self.record_write(
            Operation::DeleteNode,
            id.as_str(),
            old.as_ref().and_then(snapshot),
            None,
            result,
        )
    }

    // ========== Edges ==========

    fn get_edge(&self, id: &EdgeId) -> Option<Edge> {
        let edge = self.inner.get_edge(id);
        self.record(Operation::GetEdge, id.as_str(), None, None);
        edge
    }

    fn get_edges(&self) -> Vec<Edge> {
        let edges = self.inner.get_edges();
        self.record(Operation::GetEdges, BULK_ENTITY_ID, None, None);
        edges
    }

    fn edge_exists(&self, id: &EdgeId) -> bool {
        let exists = self.inner.edge_exists(id);
        self.record(Operation::EdgeExists, id.as_str(), None, None);
        exists
    }

    fn edge_exists_by_nodes(&self, source: &NodeId, target: &NodeId) -> bool {
        let exists = self.inner.edge_exists_by_nodes(source, target);
        self.record(
            Operation::EdgeExistsByNodes,
            &format!("{source}->{target}"),
            None,
            None,
        );
        exists
    }

    fn insert_edge(&self, edge: &Edge) -> bool {
        let inserted = self.inner.insert_edge(edge);
        self.record(Operation::InsertEdge, edge.id.as_str(), None, snapshot(edge));
        inserted
    }

    fn update_edge(&self, edge: &Edge) -> Result<bool> {
        let old = self.inner.get_edge(&edge.id);
        let result = self.inner.update_edge(edge);
        self.record_write(
            Operation::UpdateEdge,
            edge.id.as_str(),
            old.as_ref().and_then(snapshot),
            snapshot(edge),
            result,
        )
    }

    fn delete_edge(&self, id: &EdgeId) -> Result<bool> {
        let old = self.inner.get_edge(id);
        let result = self.inner.delete_edge(id);
        self.record_write(
            Operation::DeleteEdge,
            id.as_str(),
            old.as_ref().and_then(snapshot),
            None,
            result,
        )
    }

    // ========== Projects ==========

    fn get_project(&self, id: &ProjectId) -> Option<Project> {
        let project = self.inner.get_project(id);
        self.record(Operation::GetProject, id.as_str(), None, None);
        project
    }

    fn get_projects(&self) -> Vec<Project> {
        let projects = self.inner.get_projects();
        self.record(Operation::GetProjects, BULK_ENTITY_ID, None, None);
        projects
    }

    fn project_exists(&self, id: &ProjectId) -> bool {
        let exists = self.inner.project_exists(id);
        self.record(Operation::ProjectExists, id.as_str(), None, None);
        exists
    }

    fn insert_project(&self, project: &Project) -> Result<bool> {
        let result = self.inner.insert_project(project);
        self.record_write(
            Operation::InsertProject,
            project.id.as_str(),
            None,
            snapshot(project),
            result,
        )
    }

    fn update_project(&self, project: &Project) -> Result<bool> {
        let old = self.inner.get_project(&project.id);
        let result = self.inner.update_project(project);
        self.record_write(
            Operation::UpdateProject,
            project.id.as_str(),
            old.as_ref().and_then(snapshot),
            snapshot(project),
            result,
        )
    }

    fn delete_project(&self, id: &ProjectId) -> Result<bool> {
        let old = self.inner.get_project(id);
        let result = self.inner.delete_project(id);
        self.record_write(
            Operation::DeleteProject,
            id.as_str(),
            old.as_ref().and_then(snapshot),
            None,
            result,
        )
    }
}
