//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use topograph::domain::{Category, Edge, Node};
use topograph::storage::GraphRepository;

/// A node with a label derived from its id.
pub fn node(id: &str) -> Node {
    Node::new(id, id.to_uppercase(), Category::Application, "service")
}

/// An edge with id `source->target`.
pub fn edge(source: &str, target: &str) -> Edge {
    Edge::new(format!("{source}->{target}"), source, target)
}

/// Insert nodes `ids` into `repo`, asserting each insert succeeds.
pub fn seed_nodes(repo: &impl GraphRepository, ids: &[&str]) {
    for id in ids {
        assert!(repo.insert_node(&node(id)), "failed to insert node {id}");
    }
}

/// Run the topograph binary in `dir`.
pub fn run_topograph_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_topograph"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute topograph binary")
}
