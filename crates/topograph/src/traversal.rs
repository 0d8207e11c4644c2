//! Breadth-first traversal over an in-memory view of the graph.
//!
//! [`GraphView`] snapshots nodes and edges from a [`GraphRepository`] into a
//! petgraph `DiGraph`; [`traverse`] walks it from a start node following
//! edge direction.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::domain::{Edge, EdgeId, Node, NodeId};
use crate::storage::GraphRepository;

/// Directed graph snapshot used by the traversal engine.
#[derive(Debug, Default)]
pub struct GraphView {
    graph: DiGraph<Node, EdgeId>,

    /// Invariant: every node in `graph` has exactly one entry here.
    node_map: HashMap<NodeId, NodeIndex>,
}

impl GraphView {
    /// Build a view from nodes and edges.
    ///
    /// Edges whose source or target is not among `nodes` are skipped.
    pub fn new(nodes: impl IntoIterator<Item = Node>, edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut view = Self::default();

        for node in nodes {
            if view.node_map.contains_key(&node.id) {
                continue;
            }
            let id = node.id.clone();
            let index = view.graph.add_node(node);
            view.node_map.insert(id, index);
        }

        for edge in edges {
            let (Some(&from), Some(&to)) = (view.node_map.get(&edge.source), view.node_map.get(&edge.target))
            else {
                tracing::debug!(
                    id = %edge.id,
                    source = %edge.source,
                    target = %edge.target,
                    "Skipping edge with a missing endpoint"
                );
                continue;
            };
            view.graph.add_edge(from, to, edge.id);
        }

        view
    }

    /// Load every node and edge from `repo`.
    pub fn load(repo: &(impl GraphRepository + ?Sized)) -> Self {
        Self::new(repo.get_nodes(), repo.get_edges())
    }

    /// Number of nodes in the view.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges kept in the view.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the view contains `id`.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Outgoing neighbours in edge insertion order.
    fn successors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields the most recently added edge first
        let mut targets: Vec<_> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .collect();
        targets.reverse();
        targets
    }
}

/// Visit every node reachable from `start`, breadth-first.
///
/// Each reachable node is visited exactly once, `start` first. Nothing is
/// visited when `start` is not in the view.
pub fn traverse(view: &GraphView, start: &NodeId, mut visit: impl FnMut(&Node)) {
    let Some(&start_index) = view.node_map.get(start) else {
        tracing::debug!(start = %start, "Traversal start node not found");
        return;
    };

    let mut visited = HashSet::from([start_index]);
    let mut queue = VecDeque::from([start_index]);

    while let Some(current) = queue.pop_front() {
        visit(&view.graph[current]);

        for next in view.successors(current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
}

/// Nodes reachable from `start` in visit order.
pub fn reachable(view: &GraphView, start: &NodeId) -> Vec<Node> {
    let mut order = Vec::new();
    traverse(view, start, |node| order.push(node.clone()));
    order
}
