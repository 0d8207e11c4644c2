//! Request handlers.
//!
//! Each handler reads its parameters from the [`Request`], calls the
//! service over a repository chain built for the request's actor, and
//! turns the domain result into a [`Response`]. Absence becomes 404, a
//! refused edge 409, and core errors go through [`ApiError::code`].

use serde_json::json;
use topograph::app::{App, DynRepository};
use topograph::domain::{Category, DataMap, Edge, EdgeId, Node, NodeId, NodeStatus, ProjectId};
use topograph::service::GraphService;
use topograph::storage::{AuditLog, GraphRepository, StatusRepository};

use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

/// Handlers over one opened topograph repository.
#[derive(Debug)]
pub struct Controller {
    app: App,
}

impl Controller {
    /// Create a controller over `app`.
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// The wrapped application context.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Service over the decorator chain for this request's caller.
    fn service(&self, request: &Request) -> GraphService<DynRepository<'_>> {
        let actor = request.actor(self.app.config().actor());
        GraphService::new(self.app.repository_for(actor))
    }

    // ========== Nodes ==========

    /// `GET /getNode {id}`
    pub fn get_node(&self, request: &Request) -> Result<Response> {
        let id = NodeId::new(request.get_str("id")?);
        Ok(match self.service(request).node(&id) {
            Some(node) => Response::ok("Node found", node),
            None => Response::error(404, format!("Node not found: {id}")),
        })
    }

    /// `GET /getNodes`
    pub fn get_nodes(&self, request: &Request) -> Result<Response> {
        let nodes = self.service(request).nodes();
        Ok(Response::ok(format!("{} nodes", nodes.len()), nodes))
    }

    /// `POST /insertNode {id, label, category, type, data?}`
    pub fn insert_node(&self, request: &Request) -> Result<Response> {
        let category: Category = request.get_str("category")?.parse()?;
        let node = Node::new(
            request.get_str("id")?,
            request.get_str("label")?,
            category,
            request.get_str("type")?,
        )
        .with_data(request.get_map("data")?.unwrap_or_default());
        node.validate()?;

        Ok(if self.service(request).add_node(&node) {
            Response::created("Node inserted", node)
        } else {
            Response::error(500, format!("Failed to insert node: {}", node.id))
        })
    }

    /// `PUT /updateNode {id, label?, category?, type?, data?}`
    ///
    /// Absent fields keep their stored value.
    pub fn update_node(&self, request: &Request) -> Result<Response> {
        let id = NodeId::new(request.get_str("id")?);
        let service = self.service(request);
        let Some(mut node) = service.node(&id) else {
            return Ok(Response::error(404, format!("Node not found: {id}")));
        };

        if let Some(label) = request.get_opt_str("label")? {
            node.label = label.to_string();
        }
        if let Some(category) = request.get_opt_str("category")? {
            node.category = category.parse()?;
        }
        if let Some(node_type) = request.get_opt_str("type")? {
            node.node_type = node_type.to_string();
        }
        if let Some(data) = request.get_map("data")? {
            node.data = data;
        }
        node.validate()?;

        Ok(if service.update_node(&node)? {
            Response::ok("Node updated", node)
        } else {
            Response::error(404, format!("Node not found: {id}"))
        })
    }

    /// `DELETE /deleteNode {id}`
    pub fn delete_node(&self, request: &Request) -> Result<Response> {
        let id = NodeId::new(request.get_str("id")?);
        Ok(if self.service(request).delete_node(&id)? {
            Response::ok("Node deleted", json!({ "id": id }))
        } else {
            Response::error(404, format!("Node not found: {id}"))
        })
    }

    /// `GET /getNodeTypes`
    pub fn get_node_types(&self, _request: &Request) -> Result<Response> {
        let registry: DataMap = Category::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), json!(c.conventional_types())))
            .collect();
        Ok(Response::ok("Node types", registry))
    }

    // ========== Edges ==========

    /// `GET /getEdge {id}`
    pub fn get_edge(&self, request: &Request) -> Result<Response> {
        let id = EdgeId::new(request.get_str("id")?);
        Ok(match self.service(request).edge(&id) {
            Some(edge) => Response::ok("Edge found", edge),
            None => Response::error(404, format!("Edge not found: {id}")),
        })
    }

    /// `GET /getEdges`
    pub fn get_edges(&self, request: &Request) -> Result<Response> {
        let edges = self.service(request).edges();
        Ok(Response::ok(format!("{} edges", edges.len()), edges))
    }

    /// `POST /insertEdge {source, target, id?, label?, data?}`
    pub fn insert_edge(&self, request: &Request) -> Result<Response> {
        let source = NodeId::new(request.get_str("source")?);
        let target = NodeId::new(request.get_str("target")?);
        let id = request
            .get_opt_str("id")?
            .map_or_else(|| EdgeId::between(&source, &target), EdgeId::from);
        let edge = Edge::new(id, source, target)
            .with_label(request.get_opt_str("label")?.unwrap_or_default())
            .with_data(request.get_map("data")?.unwrap_or_default());
        edge.validate()?;

        let service = self.service(request);
        for endpoint in [&edge.source, &edge.target] {
            if !service.node_exists(endpoint) {
                return Ok(Response::error(404, format!("Node not found: {endpoint}")));
            }
        }

        Ok(if service.add_edge(&edge) {
            Response::created("Edge inserted", edge)
        } else {
            Response::error(
                409,
                format!(
                    "Cannot connect {} -> {}: the nodes are already connected in the other direction",
                    edge.source, edge.target
                ),
            )
        })
    }

    /// `PUT /updateEdge {id, label?, data?}`
    ///
    /// Endpoints never change; delete and re-insert to move an edge.
    pub fn update_edge(&self, request: &Request) -> Result<Response> {
        let id = EdgeId::new(request.get_str("id")?);
        let service = self.service(request);
        let Some(mut edge) = service.edge(&id) else {
            return Ok(Response::error(404, format!("Edge not found: {id}")));
        };

        if let Some(label) = request.get_opt_str("label")? {
            edge.label = label.to_string();
        }
        if let Some(data) = request.get_map("data")? {
            edge.data = data;
        }

        Ok(if service.update_edge(&edge)? {
            Response::ok("Edge updated", edge)
        } else {
            Response::error(404, format!("Edge not found: {id}"))
        })
    }

    /// `DELETE /deleteEdge {id}`
    pub fn delete_edge(&self, request: &Request) -> Result<Response> {
        let id = EdgeId::new(request.get_str("id")?);
        Ok(if self.service(request).delete_edge(&id)? {
            Response::ok("Edge deleted", json!({ "id": id }))
        } else {
            Response::error(404, format!("Edge not found: {id}"))
        })
    }

    // ========== Projects ==========

    /// `GET /getProject {id}`
    pub fn get_project(&self, request: &Request) -> Result<Response> {
        let id = ProjectId::new(request.get_str("id")?);
        Ok(match self.service(request).project(&id) {
            Some(project) => Response::ok("Project found", project),
            None => Response::error(404, format!("Project not found: {id}")),
        })
    }

    /// `GET /getProjects`
    pub fn get_projects(&self, request: &Request) -> Result<Response> {
        let projects = self.service(request).projects();
        Ok(Response::ok(format!("{} projects", projects.len()), projects))
    }

    /// `POST /insertProject {name, data?}`
    ///
    /// The caller becomes the author.
    pub fn insert_project(&self, request: &Request) -> Result<Response> {
        let name = request.get_str("name")?;
        let data = request.get_map("data")?.unwrap_or_default();
        let author = request.actor(self.app.config().actor()).user_id;

        let project = self.service(request).create_project(name, author, data)?;
        Ok(Response::created("Project inserted", project))
    }

    /// `PUT /updateProject {id, name?, data?}`
    pub fn update_project(&self, request: &Request) -> Result<Response> {
        let id = ProjectId::new(request.get_str("id")?);
        let service = self.service(request);
        let Some(mut project) = service.project(&id) else {
            return Ok(Response::error(404, format!("Project not found: {id}")));
        };

        if let Some(name) = request.get_opt_str("name")? {
            project.name = name.to_string();
        }
        if let Some(data) = request.get_map("data")? {
            project.data = data;
        }

        Ok(match service.update_project(&project)? {
            Some(project) => Response::ok("Project updated", project),
            None => Response::error(404, format!("Project not found: {id}")),
        })
    }

    /// `DELETE /deleteProject {id}`
    pub fn delete_project(&self, request: &Request) -> Result<Response> {
        let id = ProjectId::new(request.get_str("id")?);
        Ok(if self.service(request).delete_project(&id)? {
            Response::ok("Project deleted", json!({ "id": id }))
        } else {
            Response::error(404, format!("Project not found: {id}"))
        })
    }

    /// `GET /getProjectGraph {id}`
    pub fn get_project_graph(&self, request: &Request) -> Result<Response> {
        let id = ProjectId::new(request.get_str("id")?);
        Ok(match self.service(request).project_graph(&id) {
            Some(graph) => Response::ok("Project graph", graph),
            None => Response::error(404, format!("Project not found: {id}")),
        })
    }

    // ========== Status ==========

    /// `GET /getStatuses`
    pub fn get_statuses(&self, _request: &Request) -> Result<Response> {
        let records = self.app.store().get_statuses();
        Ok(Response::ok(format!("{} statuses", records.len()), records))
    }

    /// `GET /getNodeStatus {id}`
    pub fn get_node_status(&self, request: &Request) -> Result<Response> {
        let id = NodeId::new(request.get_str("id")?);
        Ok(match self.app.store().get_node_status(&id) {
            Some(status) => Response::ok("Status found", json!({ "node_id": id, "status": status })),
            None => Response::error(404, format!("No status recorded for node: {id}")),
        })
    }

    /// `POST /setNodeStatus {id, status}`
    pub fn set_node_status(&self, request: &Request) -> Result<Response> {
        let id = NodeId::new(request.get_str("id")?);
        let status: NodeStatus = request.get_str("status")?.parse()?;

        if !self.app.store().node_exists(&id) {
            tracing::warn!(node_id = %id, "Setting status for a node that does not exist");
        }
        self.app.store().set_node_status(&id, status)?;
        Ok(Response::ok("Status set", json!({ "node_id": id, "status": status })))
    }

    // ========== Graph ==========

    /// `GET /traverse {start}`
    pub fn traverse(&self, request: &Request) -> Result<Response> {
        let start = NodeId::new(request.get_str("start")?);
        let service = self.service(request);
        if !service.node_exists(&start) {
            return Ok(Response::error(404, format!("Node not found: {start}")));
        }

        let order = service.traverse(&start);
        Ok(Response::ok(format!("{} reachable nodes", order.len()), order))
    }

    /// `GET /getAuditLog {limit?}`
    ///
    /// Without a limit every record is returned, oldest first.
    pub fn get_audit_log(&self, request: &Request) -> Result<Response> {
        let limit = request.get_opt_usize("limit")?;
        let records = self.app.store().records(limit);
        Ok(Response::ok(format!("{} audit records", records.len()), records))
    }
}
