//! Request boundary for the topograph graph backend.
//!
//! Requests carry a method, a path and a parameter object. The
//! [`Router`] picks a handler by path, refuses mismatched methods, and the
//! [`Controller`] calls into `topograph` with a repository chain built for
//! the caller. Results come back as a [`Response`] envelope.
//!
//! # Routes
//!
//! ## Nodes
//! - `GET /getNode`, `GET /getNodes`, `GET /getNodeTypes`
//! - `POST /insertNode`, `PUT /updateNode`, `DELETE /deleteNode`
//!
//! ## Edges
//! - `GET /getEdge`, `GET /getEdges`
//! - `POST /insertEdge` (409 when the reverse edge exists)
//! - `PUT /updateEdge`, `DELETE /deleteEdge`
//!
//! ## Projects
//! - `GET /getProject`, `GET /getProjects`, `GET /getProjectGraph`
//! - `POST /insertProject`, `PUT /updateProject`, `DELETE /deleteProject`
//!
//! ## Status and history
//! - `GET /getStatuses`, `GET /getNodeStatus`, `POST /setNodeStatus`
//! - `GET /traverse`, `GET /getAuditLog`

pub mod controller;
pub mod error;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

pub use controller::Controller;
pub use error::{ApiError, Result};
pub use request::Request;
pub use response::{Response, ResponseStatus};
pub use router::{Method, Router};
pub use server::Server;
