//! Integration tests for the graph repository invariants: anti-parallel
//! edges, cascade on node delete, round-trips and status replacement.

use proptest::prelude::*;
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;
use topograph::domain::{Category, DataMap, EdgeId, Node, NodeId, NodeStatus, StatusRecord};
use topograph::storage::{GraphRepository, SqliteStore, StatusRepository};

mod common;
use common::{edge, node, seed_nodes};

// ========== Anti-parallel edges ==========

#[test]
fn reverse_edge_is_refused_and_state_unchanged() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed_nodes(&store, &["a", "b"]);

    assert!(store.insert_edge(&edge("a", "b")));
    let before = store.get_edges();

    assert!(!store.insert_edge(&edge("b", "a")));
    assert_eq!(store.get_edges(), before);
    assert!(!store.edge_exists_by_nodes(&"b".into(), &"a".into()));
}

#[rstest]
#[case::after_delete_reverse_is_allowed(true)]
#[case::while_present_reverse_is_refused(false)]
fn reverse_edge_after_deleting_original(#[case] delete_first: bool) {
    let store = SqliteStore::open_in_memory().unwrap();
    seed_nodes(&store, &["a", "b"]);
    assert!(store.insert_edge(&edge("a", "b")));

    if delete_first {
        assert!(store.delete_edge(&EdgeId::from("a->b")).unwrap());
    }

    assert_eq!(store.insert_edge(&edge("b", "a")), delete_first);
}

proptest! {
    /// Whatever order edges are attempted in, no unordered pair ends up
    /// connected in both directions.
    #[test]
    fn no_pair_is_connected_both_ways(
        attempts in prop::collection::vec((0usize..6, 0usize..6), 1..40)
    ) {
        let store = SqliteStore::open_in_memory().unwrap();
        let ids: Vec<String> = (0..6).map(|i| format!("n{i}")).collect();
        for id in &ids {
            prop_assert!(store.insert_node(&node(id)));
        }

        for (s, t) in attempts {
            let (source, target) = (&ids[s], &ids[t]);
            let reverse_present = store.edge_exists_by_nodes(&target.as_str().into(), &source.as_str().into());
            let inserted = store.insert_edge(&edge(source, target));
            if reverse_present {
                prop_assert!(!inserted, "{} -> {} accepted over its reverse", source, target);
            } else {
                prop_assert!(inserted, "{} -> {} refused without a reverse edge", source, target);
            }
        }

        for e in store.get_edges() {
            if e.source != e.target {
                prop_assert!(
                    !store.edge_exists_by_nodes(&e.target, &e.source),
                    "both {} -> {} and its reverse exist", e.source, e.target
                );
            }
        }
    }
}

// ========== Cascade ==========

#[test]
fn deleting_a_node_removes_exactly_its_edges() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed_nodes(&store, &["a", "b", "c", "d"]);
    for (s, t) in [("a", "b"), ("c", "a"), ("b", "c"), ("c", "d")] {
        assert!(store.insert_edge(&edge(s, t)));
    }

    assert!(store.delete_node(&NodeId::from("a")).unwrap());

    let remaining: Vec<_> = store.get_edges().into_iter().map(|e| e.id.0).collect();
    assert_eq!(remaining, vec!["b->c", "c->d"]);
    assert!(store
        .get_edges()
        .iter()
        .all(|e| e.source.as_str() != "a" && e.target.as_str() != "a"));
}

// ========== Round-trip ==========

#[test]
fn node_round_trips_through_a_file_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.db");
    let data: DataMap = json!({
        "position": {"x": 10.5, "y": -3},
        "tags": ["pci", "tier-1"],
        "owner": "payments",
        "sla": 99.95,
        "deprecated": false,
        "notes": null
    })
    .as_object()
    .cloned()
    .unwrap();
    let original = Node::new("ledger", "Ledger", Category::Application, "database").with_data(data);

    {
        let store = SqliteStore::open(&path).unwrap();
        assert!(store.insert_node(&original));
    }

    let store = SqliteStore::open(&path).unwrap();
    let loaded = store.get_node(&original.id).unwrap();
    assert_eq!(loaded, original);
    // insertion order of attributes is kept
    let keys: Vec<_> = loaded.data.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["position", "tags", "owner", "sla", "deprecated", "notes"]);
}

#[test]
fn insert_with_existing_id_reports_success_without_overwriting() {
    let store = SqliteStore::open_in_memory().unwrap();
    let first = node("a");
    let mut second = node("a");
    second.label = "Other".to_string();

    assert!(store.insert_node(&first));
    assert!(store.insert_node(&second));
    assert_eq!(store.get_node(&first.id).unwrap().label, first.label);
}

// ========== Status ==========

#[test]
fn status_is_replaced_not_duplicated() {
    let store = SqliteStore::open_in_memory().unwrap();
    let db = NodeId::from("db");
    let api = NodeId::from("api");

    store.set_node_status(&db, NodeStatus::Healthy).unwrap();
    store.set_node_status(&api, NodeStatus::Healthy).unwrap();
    store.set_node_status(&db, NodeStatus::Unhealthy).unwrap();

    let mut records = store.get_statuses();
    records.sort_by(|a, b| a.node_id.as_str().cmp(b.node_id.as_str()));
    assert_eq!(
        records,
        vec![
            StatusRecord { node_id: api, status: NodeStatus::Healthy },
            StatusRecord { node_id: db.clone(), status: NodeStatus::Unhealthy },
        ]
    );
    assert_eq!(store.get_node_status(&db), Some(NodeStatus::Unhealthy));
}

#[test]
fn status_survives_node_deletion() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed_nodes(&store, &["db"]);
    store.set_node_status(&"db".into(), NodeStatus::Maintenance).unwrap();

    assert!(store.delete_node(&"db".into()).unwrap());
    assert_eq!(store.get_node_status(&"db".into()), Some(NodeStatus::Maintenance));
}
