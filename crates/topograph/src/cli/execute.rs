//! Command execution logic.

use anyhow::{Context, Result, bail};

use super::args::{
    AuditArgs, EdgeAction, EdgeAddArgs, EdgeUpdateArgs, IdArgs, InitArgs, NodeAction, NodeAddArgs,
    NodeListArgs, NodeUpdateArgs, ProjectAction, ProjectCreateArgs, ProjectRenameArgs, StatusAction,
    StatusSetArgs, TraverseArgs,
};
use crate::app::App;
use crate::domain::{Category, DataMap, Edge, EdgeId, Node, NodeId, NodeStatus, ProjectId};
use crate::output::{self, OutputMode};
use crate::storage::{AuditLog, StatusRepository};

/// Execute the init command
pub fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(&current_dir)?;

    if !args.quiet {
        println!("Initialized topograph in {}", result.topograph_dir.display());
        println!("  Config:   {}", result.config_file.display());
        println!("  Database: {}", result.database_file.display());
    }

    Ok(())
}

// ========== Nodes ==========

/// Execute a `node` subcommand
pub fn execute_node(app: &App, action: &NodeAction, output_mode: OutputMode) -> Result<()> {
    match action {
        NodeAction::Add(args) => node_add(app, args, output_mode),
        NodeAction::Show(args) => node_show(app, args, output_mode),
        NodeAction::List(args) => node_list(app, args, output_mode),
        NodeAction::Update(args) => node_update(app, args, output_mode),
        NodeAction::Delete(args) => node_delete(app, args, output_mode),
        NodeAction::Types => node_types(output_mode),
    }
}

fn node_add(app: &App, args: &NodeAddArgs, output_mode: OutputMode) -> Result<()> {
    let service = app.service();
    let id = NodeId::new(args.id.as_str());

    if service.node_exists(&id) {
        bail!("Node '{id}' already exists");
    }

    let category = Category::from(args.category);
    if !category.is_conventional_type(&args.node_type) {
        tracing::info!(
            node_type = %args.node_type,
            %category,
            "Unconventional node type for category"
        );
    }

    let node = Node::new(id, args.label.as_str(), category, args.node_type.as_str())
        .with_data(args.data.clone().unwrap_or_default());
    if !service.add_node(&node) {
        bail!("Failed to add node '{}'", node.id);
    }

    match output_mode {
        OutputMode::Json => output::print_json(&node)?,
        OutputMode::Text => println!("Added node: {}", node.id),
    }
    Ok(())
}

fn node_show(app: &App, args: &IdArgs, output_mode: OutputMode) -> Result<()> {
    let id = NodeId::new(args.id.as_str());
    let node = app
        .service()
        .node(&id)
        .with_context(|| format!("Node not found: {id}"))?;
    let status = app.store().get_node_status(&id);

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "node": node,
            "status": status,
        }))?,
        OutputMode::Text => output::print_node(&node, status),
    }
    Ok(())
}

fn node_list(app: &App, args: &NodeListArgs, output_mode: OutputMode) -> Result<()> {
    let category = args.category.map(Category::from);
    let nodes: Vec<Node> = app
        .service()
        .nodes()
        .into_iter()
        .filter(|n| category.is_none_or(|c| n.category == c))
        .collect();

    match output_mode {
        OutputMode::Json => output::print_json(&nodes)?,
        OutputMode::Text if nodes.is_empty() => println!("No nodes found."),
        OutputMode::Text => nodes.iter().for_each(output::print_node_line),
    }
    Ok(())
}

fn node_update(app: &App, args: &NodeUpdateArgs, output_mode: OutputMode) -> Result<()> {
    let service = app.service();
    let id = NodeId::new(args.id.as_str());
    let mut node = service
        .node(&id)
        .with_context(|| format!("Node not found: {id}"))?;

    if let Some(label) = &args.label {
        node.label.clone_from(label);
    }
    if let Some(category) = args.category {
        node.category = category.into();
    }
    if let Some(node_type) = &args.node_type {
        node.node_type.clone_from(node_type);
    }
    if let Some(data) = &args.data {
        node.data.clone_from(data);
    }

    if !service.update_node(&node)? {
        bail!("Node not found: {id}");
    }

    match output_mode {
        OutputMode::Json => output::print_json(&node)?,
        OutputMode::Text => println!("Updated node: {id}"),
    }
    Ok(())
}

fn node_delete(app: &App, args: &IdArgs, output_mode: OutputMode) -> Result<()> {
    let id = NodeId::new(args.id.as_str());
    let deleted = app.service().delete_node(&id)?;
    if !deleted {
        bail!("Node not found: {id}");
    }

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "deleted": id }))?,
        OutputMode::Text => println!("Deleted node {id} and its edges"),
    }
    Ok(())
}

fn node_types(output_mode: OutputMode) -> Result<()> {
    match output_mode {
        OutputMode::Json => {
            let registry: DataMap = Category::ALL
                .iter()
                .map(|c| (c.as_str().to_string(), serde_json::json!(c.conventional_types())))
                .collect();
            output::print_json(&registry)?;
        }
        OutputMode::Text => {
            for category in Category::ALL {
                println!("{}: {}", category, category.conventional_types().join(", "));
            }
        }
    }
    Ok(())
}

// ========== Edges ==========

/// Execute an `edge` subcommand
pub fn execute_edge(app: &App, action: &EdgeAction, output_mode: OutputMode) -> Result<()> {
    match action {
        EdgeAction::Add(args) => edge_add(app, args, output_mode),
        EdgeAction::Show(args) => edge_show(app, args, output_mode),
        EdgeAction::List => edge_list(app, output_mode),
        EdgeAction::Update(args) => edge_update(app, args, output_mode),
        EdgeAction::Delete(args) => edge_delete(app, args, output_mode),
    }
}

fn edge_add(app: &App, args: &EdgeAddArgs, output_mode: OutputMode) -> Result<()> {
    let service = app.service();
    let source = NodeId::new(args.source.as_str());
    let target = NodeId::new(args.target.as_str());

    for endpoint in [&source, &target] {
        if !service.node_exists(endpoint) {
            bail!("Node not found: {endpoint}");
        }
    }

    let id = args
        .id
        .as_deref()
        .map_or_else(|| EdgeId::between(&source, &target), EdgeId::from);
    let edge = Edge::new(id, source, target)
        .with_label(args.label.clone().unwrap_or_default())
        .with_data(args.data.clone().unwrap_or_default());

    if !service.add_edge(&edge) {
        bail!(
            "Cannot connect {} -> {}: the nodes are already connected in the other direction",
            edge.source,
            edge.target
        );
    }

    match output_mode {
        OutputMode::Json => output::print_json(&edge)?,
        OutputMode::Text => println!("Added edge: {} ({} -> {})", edge.id, edge.source, edge.target),
    }
    Ok(())
}

fn edge_show(app: &App, args: &IdArgs, output_mode: OutputMode) -> Result<()> {
    let id = EdgeId::new(args.id.as_str());
    let edge = app
        .service()
        .edge(&id)
        .with_context(|| format!("Edge not found: {id}"))?;

    match output_mode {
        OutputMode::Json => output::print_json(&edge)?,
        OutputMode::Text => output::print_edge(&edge),
    }
    Ok(())
}

fn edge_list(app: &App, output_mode: OutputMode) -> Result<()> {
    let edges = app.service().edges();

    match output_mode {
        OutputMode::Json => output::print_json(&edges)?,
        OutputMode::Text if edges.is_empty() => println!("No edges found."),
        OutputMode::Text => edges.iter().for_each(output::print_edge_line),
    }
    Ok(())
}

fn edge_update(app: &App, args: &EdgeUpdateArgs, output_mode: OutputMode) -> Result<()> {
    let service = app.service();
    let id = EdgeId::new(args.id.as_str());
    let mut edge = service
        .edge(&id)
        .with_context(|| format!("Edge not found: {id}"))?;

    if let Some(label) = &args.label {
        edge.label.clone_from(label);
    }
    if let Some(data) = &args.data {
        edge.data.clone_from(data);
    }

    if !service.update_edge(&edge)? {
        bail!("Edge not found: {id}");
    }

    match output_mode {
        OutputMode::Json => output::print_json(&edge)?,
        OutputMode::Text => println!("Updated edge: {id}"),
    }
    Ok(())
}

fn edge_delete(app: &App, args: &IdArgs, output_mode: OutputMode) -> Result<()> {
    let id = EdgeId::new(args.id.as_str());
    if !app.service().delete_edge(&id)? {
        bail!("Edge not found: {id}");
    }

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "deleted": id }))?,
        OutputMode::Text => println!("Deleted edge: {id}"),
    }
    Ok(())
}

// ========== Projects ==========

/// Execute a `project` subcommand
pub fn execute_project(app: &App, action: &ProjectAction, output_mode: OutputMode) -> Result<()> {
    match action {
        ProjectAction::Create(args) => project_create(app, args, output_mode),
        ProjectAction::Show(args) => project_show(app, args, output_mode),
        ProjectAction::List => project_list(app, output_mode),
        ProjectAction::Rename(args) => project_rename(app, args, output_mode),
        ProjectAction::Delete(args) => project_delete(app, args, output_mode),
        ProjectAction::Graph(args) => project_graph(app, args, output_mode),
    }
}

fn project_create(app: &App, args: &ProjectCreateArgs, output_mode: OutputMode) -> Result<()> {
    let mut data = args.data.clone().unwrap_or_default();
    if !args.nodes.is_empty() {
        data.insert("nodes".to_string(), serde_json::json!(args.nodes));
    }

    let author = app.config().actor().user_id;
    let project = app.service().create_project(&args.name, author, data)?;

    match output_mode {
        OutputMode::Json => output::print_json(&project)?,
        OutputMode::Text => println!("Created project: {} ({})", project.id, project.name),
    }
    Ok(())
}

fn project_show(app: &App, args: &IdArgs, output_mode: OutputMode) -> Result<()> {
    let id = ProjectId::new(args.id.as_str());
    let project = app
        .service()
        .project(&id)
        .with_context(|| format!("Project not found: {id}"))?;

    match output_mode {
        OutputMode::Json => output::print_json(&project)?,
        OutputMode::Text => output::print_project(&project),
    }
    Ok(())
}

fn project_list(app: &App, output_mode: OutputMode) -> Result<()> {
    let projects = app.service().projects();

    match output_mode {
        OutputMode::Json => output::print_json(&projects)?,
        OutputMode::Text if projects.is_empty() => println!("No projects found."),
        OutputMode::Text => projects.iter().for_each(output::print_project_line),
    }
    Ok(())
}

fn project_rename(app: &App, args: &ProjectRenameArgs, output_mode: OutputMode) -> Result<()> {
    let id = ProjectId::new(args.id.as_str());
    let project = app
        .service()
        .rename_project(&id, &args.name)?
        .with_context(|| format!("Project not found: {id}"))?;

    match output_mode {
        OutputMode::Json => output::print_json(&project)?,
        OutputMode::Text => println!("Renamed project {id} to '{}'", project.name),
    }
    Ok(())
}

fn project_delete(app: &App, args: &IdArgs, output_mode: OutputMode) -> Result<()> {
    let id = ProjectId::new(args.id.as_str());
    if !app.service().delete_project(&id)? {
        bail!("Project not found: {id}");
    }

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "deleted": id }))?,
        OutputMode::Text => println!("Deleted project: {id}"),
    }
    Ok(())
}

fn project_graph(app: &App, args: &IdArgs, output_mode: OutputMode) -> Result<()> {
    let id = ProjectId::new(args.id.as_str());
    let graph = app
        .service()
        .project_graph(&id)
        .with_context(|| format!("Project not found: {id}"))?;

    match output_mode {
        OutputMode::Json => output::print_json(&graph)?,
        OutputMode::Text => output::print_project_graph(&graph),
    }
    Ok(())
}

// ========== Status ==========

/// Execute a `status` subcommand
pub fn execute_status(app: &App, action: &StatusAction, output_mode: OutputMode) -> Result<()> {
    match action {
        StatusAction::Set(args) => status_set(app, args, output_mode),
        StatusAction::Show(args) => {
            let id = NodeId::new(args.id.as_str());
            let status = app.store().get_node_status(&id);
            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "node_id": id,
                    "status": status,
                }))?,
                OutputMode::Text => match status {
                    Some(status) => println!("{id}: {}", output::colorize_status(status)),
                    None => println!("{id}: no status recorded"),
                },
            }
            Ok(())
        }
        StatusAction::List => {
            let records = app.store().get_statuses();
            match output_mode {
                OutputMode::Json => output::print_json(&records)?,
                OutputMode::Text if records.is_empty() => println!("No statuses recorded."),
                OutputMode::Text => output::print_statuses(&records),
            }
            Ok(())
        }
    }
}

fn status_set(app: &App, args: &StatusSetArgs, output_mode: OutputMode) -> Result<()> {
    let id = NodeId::new(args.id.as_str());
    let status = NodeStatus::from(args.status);

    if !app.service().node_exists(&id) {
        tracing::warn!(node_id = %id, "Setting status for a node that does not exist");
    }
    app.store().set_node_status(&id, status)?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "node_id": id,
            "status": status,
        }))?,
        OutputMode::Text => println!("{id}: {}", output::colorize_status(status)),
    }
    Ok(())
}

// ========== Graph ==========

/// Execute the traverse command
pub fn execute_traverse(app: &App, args: &TraverseArgs, output_mode: OutputMode) -> Result<()> {
    let start = NodeId::new(args.start.as_str());
    let service = app.service();
    if !service.node_exists(&start) {
        bail!("Node not found: {start}");
    }

    let order = service.traverse(&start);

    match output_mode {
        OutputMode::Json => output::print_json(&order)?,
        OutputMode::Text => order.iter().for_each(output::print_node_line),
    }
    Ok(())
}

/// Execute the audit command
pub fn execute_audit(app: &App, args: &AuditArgs, output_mode: OutputMode) -> Result<()> {
    let limit = (!args.all).then_some(args.limit);
    let records = app.store().records(limit);

    match output_mode {
        OutputMode::Json => output::print_json(&records)?,
        OutputMode::Text if records.is_empty() => println!("No audit records."),
        OutputMode::Text => output::print_audit(&records),
    }
    Ok(())
}
