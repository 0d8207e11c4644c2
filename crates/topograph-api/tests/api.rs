//! Integration tests for the request boundary over an in-memory store.

use std::io::Cursor;
use std::path::PathBuf;

use rstest::{fixture, rstest};
use serde_json::{Value, json};
use topograph::app::App;
use topograph::commands::init::TopographConfig;
use topograph::storage::{AuditLog, SqliteStore};
use topograph_api::{Controller, Request, Response, ResponseStatus, Server};

mod helpers {
    use super::*;

    pub fn request(method: &str, path: &str, data: Value) -> Request {
        let Value::Object(data) = data else {
            panic!("request data must be an object");
        };
        Request::new(method, path, data)
    }

    pub fn call(server: &Server, method: &str, path: &str, data: Value) -> Response {
        server.handle(&request(method, path, data))
    }

    pub fn add_node(server: &Server, id: &str) {
        let response = call(
            server,
            "POST",
            "/insertNode",
            json!({"id": id, "label": id.to_uppercase(), "category": "application", "type": "service"}),
        );
        assert_eq!(response.code, 201, "{}", response.message);
    }

    pub fn add_edge(server: &Server, source: &str, target: &str) -> Response {
        call(server, "POST", "/insertEdge", json!({"source": source, "target": target}))
    }

    pub fn ids(data: &Value) -> Vec<&str> {
        data.as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_str().unwrap())
            .collect()
    }

    pub fn audit_count(server: &Server) -> usize {
        server.controller().app().store().records(None).len()
    }
}

use helpers::*;

#[fixture]
fn server() -> Server {
    let store = SqliteStore::open_in_memory().unwrap();
    let app = App::new(store, TopographConfig::default(), PathBuf::from("."));
    Server::new(Controller::new(app))
}

// =========================================================================
// Routing
// =========================================================================

#[rstest]
#[case::insert_with_get("GET", "/insertNode")]
#[case::read_with_post("POST", "/getNodes")]
#[case::delete_with_put("PUT", "/deleteEdge")]
#[case::status_with_get("GET", "/setNodeStatus")]
fn wrong_method_is_refused_before_storage(server: Server, #[case] method: &str, #[case] path: &str) {
    let response = call(&server, method, path, json!({"id": "x"}));

    assert_eq!(response.code, 405);
    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(audit_count(&server), 0);
}

#[rstest]
fn unknown_path_is_not_found(server: Server) {
    let response = call(&server, "GET", "/getEverything", json!({}));
    assert_eq!(response.code, 404);
}

#[rstest]
#[case::missing_id("GET", "/getNode", json!({}), "id")]
#[case::missing_target("POST", "/insertEdge", json!({"source": "a"}), "target")]
#[case::bad_category("POST", "/insertNode", json!({"id": "a", "label": "A", "category": "cloud", "type": "vm"}), "category")]
#[case::bad_status("POST", "/setNodeStatus", json!({"id": "a", "status": "sleeping"}), "status")]
#[case::data_not_object("POST", "/insertNode", json!({"id": "a", "label": "A", "category": "business", "type": "actor", "data": [1]}), "data")]
#[case::blank_id("POST", "/insertNode", json!({"id": " ", "label": "A", "category": "business", "type": "actor"}), "id")]
fn invalid_requests_are_client_errors(
    server: Server,
    #[case] method: &str,
    #[case] path: &str,
    #[case] data: Value,
    #[case] field: &str,
) {
    let response = call(&server, method, path, data);

    assert_eq!(response.code, 400);
    assert!(response.message.contains(field), "message was: {}", response.message);
    assert!(response.data.is_null());
}

// =========================================================================
// Nodes and edges
// =========================================================================

#[rstest]
fn node_lifecycle(server: Server) {
    let inserted = call(
        &server,
        "POST",
        "/insertNode",
        json!({"id": "api", "label": "API", "category": "application", "type": "service", "data": {"x": 10, "y": 20}}),
    );
    assert_eq!(inserted.code, 201);

    let fetched = call(&server, "GET", "/getNode", json!({"id": "api"}));
    assert_eq!(fetched.data, inserted.data);
    assert_eq!(fetched.data["data"], json!({"x": 10, "y": 20}));

    let updated = call(&server, "PUT", "/updateNode", json!({"id": "api", "label": "Gateway"}));
    assert_eq!(updated.code, 200);
    assert_eq!(updated.data["label"], "Gateway");
    assert_eq!(updated.data["type"], "service");

    let deleted = call(&server, "DELETE", "/deleteNode", json!({"id": "api"}));
    assert_eq!(deleted.code, 200);
    assert_eq!(call(&server, "GET", "/getNode", json!({"id": "api"})).code, 404);
    assert_eq!(call(&server, "DELETE", "/deleteNode", json!({"id": "api"})).code, 404);
}

#[rstest]
fn reverse_edge_is_a_conflict(server: Server) {
    add_node(&server, "a");
    add_node(&server, "b");

    let first = add_edge(&server, "a", "b");
    assert_eq!(first.code, 201);
    assert_eq!(first.data["id"], "a--b");

    let reverse = add_edge(&server, "b", "a");
    assert_eq!(reverse.code, 409);

    let edges = call(&server, "GET", "/getEdges", json!({}));
    assert_eq!(ids(&edges.data), vec!["a--b"]);
}

#[rstest]
fn edge_to_missing_node_is_not_found(server: Server) {
    add_node(&server, "a");

    let response = add_edge(&server, "a", "ghost");
    assert_eq!(response.code, 404);
    assert!(response.message.contains("ghost"));
}

#[rstest]
fn edge_update_keeps_endpoints(server: Server) {
    add_node(&server, "a");
    add_node(&server, "b");
    add_edge(&server, "a", "b");

    let updated = call(
        &server,
        "PUT",
        "/updateEdge",
        json!({"id": "a--b", "label": "calls", "source": "b"}),
    );
    assert_eq!(updated.code, 200);
    assert_eq!(updated.data["label"], "calls");
    assert_eq!(updated.data["source"], "a");
}

#[rstest]
fn deleting_node_cascades_to_edges(server: Server) {
    for id in ["a", "b", "c"] {
        add_node(&server, id);
    }
    add_edge(&server, "a", "b");
    add_edge(&server, "b", "c");

    call(&server, "DELETE", "/deleteNode", json!({"id": "b"}));

    let edges = call(&server, "GET", "/getEdges", json!({}));
    assert!(edges.data.as_array().unwrap().is_empty());
}

#[rstest]
fn traverse_returns_breadth_first_order(server: Server) {
    for id in ["a", "b", "c", "d", "island"] {
        add_node(&server, id);
    }
    add_edge(&server, "a", "b");
    add_edge(&server, "a", "c");
    add_edge(&server, "b", "d");
    add_edge(&server, "c", "d");

    let response = call(&server, "GET", "/traverse", json!({"start": "a"}));
    assert_eq!(ids(&response.data), vec!["a", "b", "c", "d"]);

    let missing = call(&server, "GET", "/traverse", json!({"start": "nowhere"}));
    assert_eq!(missing.code, 404);
}

#[rstest]
fn node_types_cover_every_category(server: Server) {
    let response = call(&server, "GET", "/getNodeTypes", json!({}));
    let registry = response.data.as_object().unwrap();

    assert_eq!(registry.len(), 3);
    assert!(registry["application"].as_array().unwrap().contains(&json!("database")));
}

// =========================================================================
// Projects, status, audit
// =========================================================================

#[rstest]
fn project_lifecycle(server: Server) {
    for id in ["web", "api", "db"] {
        add_node(&server, id);
    }
    add_edge(&server, "web", "api");
    add_edge(&server, "api", "db");

    let created = server.handle(
        &request("POST", "/insertProject", json!({"name": "Checkout", "data": {"nodes": ["web", "api"]}}))
            .with_actor(&topograph::domain::Actor::new("frank", "198.51.100.4")),
    );
    assert_eq!(created.code, 201);
    assert_eq!(created.data["author"], "frank");
    let id = created.data["id"].as_str().unwrap().to_string();

    let graph = call(&server, "GET", "/getProjectGraph", json!({"id": id}));
    assert_eq!(ids(&graph.data["nodes"]), vec!["web", "api"]);
    assert_eq!(ids(&graph.data["edges"]), vec!["web--api"]);

    let renamed = call(&server, "PUT", "/updateProject", json!({"id": id, "name": "Checkout v2"}));
    assert_eq!(renamed.data["name"], "Checkout v2");
    assert_eq!(renamed.data["created_at"], created.data["created_at"]);

    assert_eq!(call(&server, "DELETE", "/deleteProject", json!({"id": id})).code, 200);
    assert_eq!(call(&server, "GET", "/getProject", json!({"id": id})).code, 404);
}

#[rstest]
fn status_is_replaced_not_appended(server: Server) {
    add_node(&server, "db");

    assert_eq!(call(&server, "GET", "/getNodeStatus", json!({"id": "db"})).code, 404);
    call(&server, "POST", "/setNodeStatus", json!({"id": "db", "status": "maintenance"}));
    call(&server, "POST", "/setNodeStatus", json!({"id": "db", "status": "healthy"}));

    let status = call(&server, "GET", "/getNodeStatus", json!({"id": "db"}));
    assert_eq!(status.data["status"], "healthy");
    let all = call(&server, "GET", "/getStatuses", json!({}));
    assert_eq!(all.data.as_array().unwrap().len(), 1);
}

#[rstest]
fn audit_log_records_request_actor(server: Server) {
    let request = request(
        "POST",
        "/insertNode",
        json!({"id": "api", "label": "API", "category": "application", "type": "service"}),
    )
    .with_actor(&topograph::domain::Actor::new("grace", "192.0.2.7"));
    server.handle(&request);

    let log = call(&server, "GET", "/getAuditLog", json!({"limit": 1}));
    let records = log.data.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["action"], "insert_node");
    assert_eq!(records[0]["user_id"], "grace");
    assert_eq!(records[0]["ip_address"], "192.0.2.7");
    assert!(records[0]["old_data"].is_null());
}

// =========================================================================
// Stdio transport
// =========================================================================

#[rstest]
fn run_answers_each_line(server: Server) {
    let input = [
        r#"{"method": "POST", "path": "/insertNode", "data": {"id": "a", "label": "A", "category": "business", "type": "actor"}}"#,
        "",
        "not json",
        r#"{"method": "GET", "path": "/getNodes"}"#,
    ]
    .join("\n");
    let mut output = Vec::new();

    let handled = server.run(Cursor::new(input), &mut output).unwrap();
    assert_eq!(handled, 3);

    let responses: Vec<Response> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let codes: Vec<u16> = responses.iter().map(|r| r.code).collect();
    assert_eq!(codes, vec![201, 400, 200]);
    assert_eq!(ids(&responses[2].data), vec!["a"]);
}
