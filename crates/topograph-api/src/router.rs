//! Method + path routing.

use std::collections::HashMap;
use std::fmt;

use crate::controller::Controller;
use crate::error::{ApiError, Result};
use crate::request::Request;
use crate::response::Response;

/// HTTP-style request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read
    Get,
    /// Create
    Post,
    /// Update
    Put,
    /// Delete
    Delete,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether `method` names this method, ignoring case.
    pub fn matches(self, method: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(method.trim())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request handler.
pub type Handler = fn(&Controller, &Request) -> Result<Response>;

#[derive(Clone, Copy)]
struct Route {
    method: Method,
    handler: Handler,
}

/// Handlers keyed by path, each accepting exactly one method.
#[derive(Default)]
pub struct Router {
    routes: HashMap<&'static str, Route>,
}

impl Router {
    /// An empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method path`, replacing any earlier route
    /// on the same path.
    #[must_use]
    pub fn route(mut self, method: Method, path: &'static str, handler: Handler) -> Self {
        self.routes.insert(path, Route { method, handler });
        self
    }

    /// The full topograph API.
    pub fn api() -> Self {
        use Method::{Delete, Get, Post, Put};

        Self::new()
            .route(Get, "/getNode", Controller::get_node)
            .route(Get, "/getNodes", Controller::get_nodes)
            .route(Post, "/insertNode", Controller::insert_node)
            .route(Put, "/updateNode", Controller::update_node)
            .route(Delete, "/deleteNode", Controller::delete_node)
            .route(Get, "/getNodeTypes", Controller::get_node_types)
            .route(Get, "/getEdge", Controller::get_edge)
            .route(Get, "/getEdges", Controller::get_edges)
            .route(Post, "/insertEdge", Controller::insert_edge)
            .route(Put, "/updateEdge", Controller::update_edge)
            .route(Delete, "/deleteEdge", Controller::delete_edge)
            .route(Get, "/getProject", Controller::get_project)
            .route(Get, "/getProjects", Controller::get_projects)
            .route(Post, "/insertProject", Controller::insert_project)
            .route(Put, "/updateProject", Controller::update_project)
            .route(Delete, "/deleteProject", Controller::delete_project)
            .route(Get, "/getProjectGraph", Controller::get_project_graph)
            .route(Get, "/getStatuses", Controller::get_statuses)
            .route(Get, "/getNodeStatus", Controller::get_node_status)
            .route(Post, "/setNodeStatus", Controller::set_node_status)
            .route(Get, "/traverse", Controller::traverse)
            .route(Get, "/getAuditLog", Controller::get_audit_log)
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&'static str> {
        let mut paths: Vec<_> = self.routes.keys().copied().collect();
        paths.sort_unstable();
        paths
    }

    /// Run the handler for `request`.
    ///
    /// The method is checked before the handler runs, so a mismatched
    /// method never reaches storage.
    pub fn dispatch(&self, controller: &Controller, request: &Request) -> Response {
        let result = match self.routes.get(request.path.as_str()) {
            None => Err(ApiError::NotFound {
                path: request.path.clone(),
            }),
            Some(route) if !route.method.matches(&request.method) => Err(ApiError::MethodNotAllowed {
                method: request.method.clone(),
                path: request.path.clone(),
            }),
            Some(route) => (route.handler)(controller, request),
        };

        result.unwrap_or_else(|err| {
            if err.code() >= 500 {
                tracing::warn!(path = %request.path, error = %err, "Request failed");
            }
            Response::from(err)
        })
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("paths", &self.paths()).finish()
    }
}
