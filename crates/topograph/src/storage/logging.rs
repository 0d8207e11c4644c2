//! Tracing decorator for repository calls.

use std::fmt::Display;

use super::{GraphRepository, Operation};
use crate::domain::{Edge, EdgeId, Node, NodeId, Project, ProjectId};
use crate::error::Result;

/// Emit the per-call trace event under a stable target so it can be
/// filtered with `RUST_LOG=topograph::repository=debug`.
macro_rules! trace_call {
    ($operation:expr $(, $($field:tt)*)?) => {
        tracing::debug!(target: "topograph::repository", operation = %$operation $(, $($field)*)?)
    };
}

/// Repository decorator that logs each call before delegating.
///
/// Results pass through unchanged; writes that fail are also logged at
/// `warn`.
#[derive(Debug)]
pub struct LoggingRepository<R> {
    inner: R,
}

impl<R: GraphRepository> LoggingRepository<R> {
    /// Wrap `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// The wrapped repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

fn warn_on_err<T>(operation: Operation, id: &dyn Display, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        tracing::warn!(
            target: "topograph::repository",
            operation = %operation,
            id = %id,
            error = %e,
            "Repository write failed"
        );
    }
    result
}

impl<R: GraphRepository> GraphRepository for LoggingRepository<R> {
    fn get_node(&self, id: &NodeId) -> Option<Node> {
        trace_call!(Operation::GetNode, %id);
        self.inner.get_node(id)
    }

    fn get_nodes(&self) -> Vec<Node> {
        trace_call!(Operation::GetNodes);
        self.inner.get_nodes()
    }

    fn node_exists(&self, id: &NodeId) -> bool {
        trace_call!(Operation::NodeExists, %id);
        self.inner.node_exists(id)
    }

    fn insert_node(&self, node: &Node) -> bool {
        trace_call!(Operation::InsertNode, id = %node.id, category = %node.category);
        self.inner.insert_node(node)
    }

    fn update_node(&self, node: &Node) -> Result<bool> {
        trace_call!(Operation::UpdateNode, id = %node.id);
        warn_on_err(Operation::UpdateNode, &node.id, self.inner.update_node(node))
    }

    fn delete_node(&self, id: &NodeId) -> Result<bool> {
        trace_call!(Operation::DeleteNode, %id);
        warn_on_err(Operation::DeleteNode, id, self.inner.delete_node(id))
    }

    fn get_edge(&self, id: &EdgeId) -> Option<Edge> {
        trace_call!(Operation::GetEdge, %id);
        self.inner.get_edge(id)
    }

    fn get_edges(&self) -> Vec<Edge> {
        trace_call!(Operation::GetEdges);
        self.inner.get_edges()
    }

    fn edge_exists(&self, id: &EdgeId) -> bool {
        trace_call!(Operation::EdgeExists, %id);
        self.inner.edge_exists(id)
    }

    fn edge_exists_by_nodes(&self, source: &NodeId, target: &NodeId) -> bool {
        trace_call!(Operation::EdgeExistsByNodes, %source, %target);
        self.inner.edge_exists_by_nodes(source, target)
    }

    fn insert_edge(&self, edge: &Edge) -> bool {
        trace_call!(
            Operation::InsertEdge,
            id = %edge.id,
            source = %edge.source,
            target = %edge.target
        );
        self.inner.insert_edge(edge)
    }

    fn update_edge(&self, edge: &Edge) -> Result<bool> {
        trace_call!(Operation::UpdateEdge, id = %edge.id);
        warn_on_err(Operation::UpdateEdge, &edge.id, self.inner.update_edge(edge))
    }

    fn delete_edge(&self, id: &EdgeId) -> Result<bool> {
        trace_call!(Operation::DeleteEdge, %id);
        warn_on_err(Operation::DeleteEdge, id, self.inner.delete_edge(id))
    }

    fn get_project(&self, id: &ProjectId) -> Option<Project> {
        trace_call!(Operation::GetProject, %id);
        self.inner.get_project(id)
    }

    fn get_projects(&self) -> Vec<Project> {
        trace_call!(Operation::GetProjects);
        self.inner.get_projects()
    }

    fn project_exists(&self, id: &ProjectId) -> bool {
        trace_call!(Operation::ProjectExists, %id);
        self.inner.project_exists(id)
    }

    fn insert_project(&self, project: &Project) -> Result<bool> {
        trace_call!(Operation::InsertProject, id = %project.id, name = %project.name);
        warn_on_err(
            Operation::InsertProject,
            &project.id,
            self.inner.insert_project(project),
        )
    }

    fn update_project(&self, project: &Project) -> Result<bool> {
        trace_call!(Operation::UpdateProject, id = %project.id);
        warn_on_err(
            Operation::UpdateProject,
            &project.id,
            self.inner.update_project(project),
        )
    }

    fn delete_project(&self, id: &ProjectId) -> Result<bool> {
        trace_call!(Operation::DeleteProject, %id);
        warn_on_err(Operation::DeleteProject, id, self.inner.delete_project(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Actor, Category};
    use crate::storage::{AuditLog, AuditingRepository, SqliteStore};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn with_captured_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        logs.contents()
    }

    #[test]
    fn each_call_emits_one_event_with_operation_and_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let repo = LoggingRepository::new(&store);

        let output = with_captured_logs(|| {
            assert!(repo.insert_node(&Node::new("api", "API", Category::Application, "service")));
            assert!(repo.node_exists(&"api".into()));
        });

        let lines: Vec<_> = output
            .lines()
            .filter(|l| l.contains("topograph::repository"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("operation=insert_node"));
        assert!(lines[0].contains("id=api"));
        assert!(lines[1].contains("operation=get_node_exists"));
    }

    #[test]
    fn failed_write_is_logged_and_returned() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.execute_raw("DROP TABLE projects").unwrap();
        let repo = LoggingRepository::new(&store);

        let output = with_captured_logs(|| {
            assert!(repo.delete_project(&"p-1".into()).is_err());
        });

        assert!(output.contains("WARN"));
        assert!(output.contains("Repository write failed"));
    }

    #[test]
    fn stacks_with_the_audit_decorator_in_either_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        let node = Node::new("db", "DB", Category::Application, "database");

        let outer_logging = LoggingRepository::new(AuditingRepository::new(&store, &store, Actor::system()));
        assert!(outer_logging.insert_node(&node));

        let outer_audit = AuditingRepository::new(LoggingRepository::new(&store), &store, Actor::system());
        assert!(outer_audit.node_exists(&node.id));

        let actions: Vec<_> = store.records(None).into_iter().map(|r| r.action).collect();
        assert_eq!(actions, vec!["insert_node", "get_node_exists"]);
    }
}
