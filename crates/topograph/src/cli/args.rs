//! CLI argument structs for all commands.

use clap::{Parser, Subcommand};

use super::types::{CategoryArg, StatusArg};
use super::validators::{parse_data, validate_id, validate_label};
use crate::domain::DataMap;

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

// ========== Nodes ==========

/// Node subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum NodeAction {
    /// Add a node
    Add(NodeAddArgs),

    /// Show one node with its current status
    Show(IdArgs),

    /// List nodes
    List(NodeListArgs),

    /// Change label, category, type or data of a node
    Update(NodeUpdateArgs),

    /// Delete a node and every edge touching it
    Delete(IdArgs),

    /// List the conventional node types per category
    Types,
}

/// Arguments for `node add`
#[derive(Parser, Debug, Clone)]
pub struct NodeAddArgs {
    /// Node ID
    #[arg(value_parser = validate_id)]
    pub id: String,

    /// Display label
    #[arg(short, long, value_parser = validate_label)]
    pub label: String,

    /// Architectural layer
    #[arg(short, long, value_enum)]
    pub category: CategoryArg,

    /// Node type, e.g. service or database
    #[arg(short = 't', long = "type")]
    pub node_type: String,

    /// Attributes as a JSON object
    #[arg(short, long, value_parser = parse_data)]
    pub data: Option<DataMap>,
}

/// Arguments for `node list`
#[derive(Parser, Debug, Clone)]
pub struct NodeListArgs {
    /// Only nodes in this category
    #[arg(short, long, value_enum)]
    pub category: Option<CategoryArg>,
}

/// Arguments for `node update`
#[derive(Parser, Debug, Clone)]
pub struct NodeUpdateArgs {
    /// Node ID
    #[arg(value_parser = validate_id)]
    pub id: String,

    /// New label
    #[arg(short, long, value_parser = validate_label)]
    pub label: Option<String>,

    /// New category
    #[arg(short, long, value_enum)]
    pub category: Option<CategoryArg>,

    /// New type
    #[arg(short = 't', long = "type")]
    pub node_type: Option<String>,

    /// Replacement attributes as a JSON object
    #[arg(short, long, value_parser = parse_data)]
    pub data: Option<DataMap>,
}

/// A single entity id
#[derive(Parser, Debug, Clone)]
pub struct IdArgs {
    /// Entity ID
    #[arg(value_parser = validate_id)]
    pub id: String,
}

// ========== Edges ==========

/// Edge subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum EdgeAction {
    /// Connect two nodes
    ///
    /// Fails if the reverse connection already exists.
    Add(EdgeAddArgs),

    /// Show one edge
    Show(IdArgs),

    /// List edges
    List,

    /// Change the label or data of an edge
    Update(EdgeUpdateArgs),

    /// Delete an edge
    Delete(IdArgs),
}

/// Arguments for `edge add`
#[derive(Parser, Debug, Clone)]
pub struct EdgeAddArgs {
    /// Source node ID
    #[arg(value_parser = validate_id)]
    pub source: String,

    /// Target node ID
    #[arg(value_parser = validate_id)]
    pub target: String,

    /// Edge ID (defaults to `source--target`)
    #[arg(long, value_parser = validate_id)]
    pub id: Option<String>,

    /// Display label
    #[arg(short, long)]
    pub label: Option<String>,

    /// Attributes as a JSON object
    #[arg(short, long, value_parser = parse_data)]
    pub data: Option<DataMap>,
}

/// Arguments for `edge update`
#[derive(Parser, Debug, Clone)]
pub struct EdgeUpdateArgs {
    /// Edge ID
    #[arg(value_parser = validate_id)]
    pub id: String,

    /// New label
    #[arg(short, long)]
    pub label: Option<String>,

    /// Replacement attributes as a JSON object
    #[arg(short, long, value_parser = parse_data)]
    pub data: Option<DataMap>,
}

// ========== Projects ==========

/// Project subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectAction {
    /// Create a project
    Create(ProjectCreateArgs),

    /// Show one project
    Show(IdArgs),

    /// List projects
    List,

    /// Rename a project
    Rename(ProjectRenameArgs),

    /// Delete a project (its nodes and edges are kept)
    Delete(IdArgs),

    /// Show the nodes and edges listed in a project
    Graph(IdArgs),
}

/// Arguments for `project create`
#[derive(Parser, Debug, Clone)]
pub struct ProjectCreateArgs {
    /// Project name
    #[arg(value_parser = validate_label)]
    pub name: String,

    /// Member node IDs (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub nodes: Vec<String>,

    /// Extra metadata as a JSON object
    #[arg(short, long, value_parser = parse_data)]
    pub data: Option<DataMap>,
}

/// Arguments for `project rename`
#[derive(Parser, Debug, Clone)]
pub struct ProjectRenameArgs {
    /// Project ID
    #[arg(value_parser = validate_id)]
    pub id: String,

    /// New name
    #[arg(value_parser = validate_label)]
    pub name: String,
}

// ========== Status ==========

/// Status subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum StatusAction {
    /// Set the status of a node
    Set(StatusSetArgs),

    /// Show the status of a node
    Show(IdArgs),

    /// List all statuses
    List,
}

/// Arguments for `status set`
#[derive(Parser, Debug, Clone)]
pub struct StatusSetArgs {
    /// Node ID
    #[arg(value_parser = validate_id)]
    pub id: String,

    /// New status
    #[arg(value_enum)]
    pub status: StatusArg,
}

// ========== Graph ==========

/// Arguments for `traverse`
#[derive(Parser, Debug, Clone)]
pub struct TraverseArgs {
    /// Node to start from
    #[arg(value_parser = validate_id)]
    pub start: String,
}

/// Arguments for `audit`
#[derive(Parser, Debug, Clone)]
pub struct AuditArgs {
    /// Show only the most recent N records
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,

    /// Show every record
    #[arg(long, conflicts_with = "limit")]
    pub all: bool,
}
