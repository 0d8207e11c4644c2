//! Output formatting for CLI commands.
//!
//! Text output for people, JSON for scripts. Colors follow `colored`'s
//! handling of `NO_COLOR` and non-terminal stdout.

use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;

use crate::domain::{AuditRecord, Category, Edge, Node, NodeStatus, Project, StatusRecord};
use crate::service::ProjectGraph;

/// Output mode for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Print any serializable value as pretty JSON to stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)
}

/// Apply semantic color to a status value.
pub fn colorize_status(status: NodeStatus) -> String {
    let text = status.as_str();
    match status {
        NodeStatus::Healthy => text.green().to_string(),
        NodeStatus::Unhealthy => text.red().bold().to_string(),
        NodeStatus::Maintenance => text.yellow().to_string(),
        NodeStatus::Unknown => text.dimmed().to_string(),
    }
}

fn colorize_category(category: Category) -> String {
    let text = category.as_str();
    match category {
        Category::Business => text.magenta().to_string(),
        Category::Application => text.blue().to_string(),
        Category::Infrastructure => text.cyan().to_string(),
    }
}

fn print_data(data: &crate::domain::DataMap) {
    if data.is_empty() {
        return;
    }
    println!("  {}", "data:".dimmed());
    for (key, value) in data {
        println!("    {key}: {value}");
    }
}

/// One-line node summary.
pub fn print_node_line(node: &Node) {
    println!(
        "{}  {}  [{} / {}]",
        node.id.as_str().cyan(),
        node.label,
        colorize_category(node.category),
        node.node_type
    );
}

/// Full node details, with status if one is recorded.
pub fn print_node(node: &Node, status: Option<NodeStatus>) {
    println!("{}", node.id.as_str().cyan().bold());
    println!("  {} {}", "label:".dimmed(), node.label);
    println!("  {} {}", "category:".dimmed(), colorize_category(node.category));
    println!("  {} {}", "type:".dimmed(), node.node_type);
    if let Some(status) = status {
        println!("  {} {}", "status:".dimmed(), colorize_status(status));
    }
    print_data(&node.data);
}

/// One-line edge summary.
pub fn print_edge_line(edge: &Edge) {
    let label = if edge.label.is_empty() {
        String::new()
    } else {
        format!("  ({})", edge.label)
    };
    println!(
        "{}  {} -> {}{label}",
        edge.id.as_str().cyan(),
        edge.source,
        edge.target
    );
}

/// Full edge details.
pub fn print_edge(edge: &Edge) {
    print_edge_line(edge);
    print_data(&edge.data);
}

/// One-line project summary.
pub fn print_project_line(project: &Project) {
    println!(
        "{}  {}  by {}  (updated {})",
        project.id.as_str().cyan(),
        project.name.bold(),
        project.author,
        project.updated_at.format("%Y-%m-%d %H:%M")
    );
}

/// Full project details.
pub fn print_project(project: &Project) {
    println!("{}", project.id.as_str().cyan().bold());
    println!("  {} {}", "name:".dimmed(), project.name);
    println!("  {} {}", "author:".dimmed(), project.author);
    println!("  {} {}", "created:".dimmed(), project.created_at.to_rfc3339());
    println!("  {} {}", "updated:".dimmed(), project.updated_at.to_rfc3339());
    print_data(&project.data);
}

/// Project subgraph.
pub fn print_project_graph(graph: &ProjectGraph) {
    print_project_line(&graph.project);
    println!();
    println!("{} ({})", "Nodes".bold(), graph.nodes.len());
    for node in &graph.nodes {
        print!("  ");
        print_node_line(node);
    }
    println!("{} ({})", "Edges".bold(), graph.edges.len());
    for edge in &graph.edges {
        print!("  ");
        print_edge_line(edge);
    }
}

/// Status table.
pub fn print_statuses(records: &[StatusRecord]) {
    for record in records {
        println!("{}  {}", record.node_id.as_str().cyan(), colorize_status(record.status));
    }
}

/// Audit trail, oldest first.
pub fn print_audit(records: &[AuditRecord]) {
    for record in records {
        println!(
            "{:>5}  {}  {:<26}  {}:{}  {}@{}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.action.yellow(),
            record.entity_type,
            record.entity_id.cyan(),
            record.user_id,
            record.ip_address
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_survives_colorizing() {
        colored::control::set_override(false);
        assert_eq!(colorize_status(NodeStatus::Maintenance), "maintenance");
        assert_eq!(colorize_category(Category::Business), "business");
        colored::control::unset_override();
    }
}
