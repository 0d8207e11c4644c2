//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a new topograph repository
//! - `node`: Add, show, list, update and delete nodes
//! - `edge`: Connect nodes and manage edges
//! - `project`: Manage named views of the graph
//! - `status`: Record and read node health
//! - `traverse`: List nodes reachable from a start node
//! - `audit`: Show the audit trail
//!
//! # Example
//!
//! ```bash
//! topograph node add api --label "Public API" --category application --type service
//! topograph node add db --label "Orders DB" --category application --type database
//! topograph edge add api db --label reads
//! topograph status set db maintenance
//! topograph traverse api --json
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    AuditArgs, EdgeAction, EdgeAddArgs, EdgeUpdateArgs, IdArgs, InitArgs, NodeAction, NodeAddArgs,
    NodeListArgs, NodeUpdateArgs, ProjectAction, ProjectCreateArgs, ProjectRenameArgs, StatusAction,
    StatusSetArgs, TraverseArgs,
};
pub use types::{CategoryArg, StatusArg};
pub use validators::{parse_data, validate_id, validate_label};

/// Topograph - edit architecture graphs from the command line
///
/// Nodes, edges, projects and node status are stored in `.topograph/graph.db`.
/// Every repository call is recorded in an audit trail.
#[derive(Parser, Debug)]
#[command(name = "topograph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new topograph repository
    ///
    /// Creates `.topograph/` with a configuration file and an empty database.
    Init(InitArgs),

    /// Manage nodes
    Node {
        /// Node action
        #[command(subcommand)]
        action: NodeAction,
    },

    /// Manage edges
    Edge {
        /// Edge action
        #[command(subcommand)]
        action: EdgeAction,
    },

    /// Manage projects
    Project {
        /// Project action
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage node status
    Status {
        /// Status action
        #[command(subcommand)]
        action: StatusAction,
    },

    /// List nodes reachable from a start node, breadth-first
    Traverse(TraverseArgs),

    /// Show the audit trail
    Audit(AuditArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("topograph {}", env!("CARGO_PKG_VERSION"));
            println!("Run 'topograph --help' for usage information.");
            return Ok(());
        };

        if let Commands::Init(args) = command {
            return execute::execute_init(args);
        }

        let app = App::from_directory(&std::env::current_dir()?)?;
        match command {
            Commands::Init(_) => Ok(()),
            Commands::Node { action } => execute::execute_node(&app, action, output_mode),
            Commands::Edge { action } => execute::execute_edge(&app, action, output_mode),
            Commands::Project { action } => execute::execute_project(&app, action, output_mode),
            Commands::Status { action } => execute::execute_status(&app, action, output_mode),
            Commands::Traverse(args) => execute::execute_traverse(&app, args, output_mode),
            Commands::Audit(args) => execute::execute_audit(&app, args, output_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_node_add() {
        let cli = Cli::try_parse_from([
            "topograph", "node", "add", "api", "--label", "Public API", "--category",
            "application", "--type", "service", "--data", r#"{"x": 10}"#,
        ])
        .unwrap();

        let Some(Commands::Node {
            action: NodeAction::Add(args),
        }) = cli.command
        else {
            panic!("expected node add");
        };
        assert_eq!(args.id, "api");
        assert_eq!(args.category, CategoryArg::Application);
        assert_eq!(args.data.unwrap()["x"], serde_json::json!(10));
    }

    #[test]
    fn json_flag_is_global() {
        let cli = Cli::try_parse_from(["topograph", "edge", "list", "--json"]).unwrap();
        assert!(cli.json);
    }

    #[rstest]
    #[case::bad_category(&["topograph", "node", "add", "x", "-l", "X", "-c", "cloud", "-t", "vm"])]
    #[case::blank_id(&["topograph", "node", "show", "  "])]
    #[case::bad_status(&["topograph", "status", "set", "db", "sleeping"])]
    #[case::data_not_object(&["topograph", "edge", "update", "e1", "--data", "[1]"])]
    fn rejects_invalid_input(#[case] argv: &[&str]) {
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn edge_add_takes_endpoints_positionally() {
        let cli = Cli::try_parse_from(["topograph", "edge", "add", "web", "api", "-l", "calls"]).unwrap();
        let Some(Commands::Edge {
            action: EdgeAction::Add(args),
        }) = cli.command
        else {
            panic!("expected edge add");
        };
        assert_eq!((args.source.as_str(), args.target.as_str()), ("web", "api"));
        assert_eq!(args.id, None);
    }

    #[test]
    fn audit_all_conflicts_with_explicit_limit() {
        assert!(Cli::try_parse_from(["topograph", "audit", "--all", "--limit", "5"]).is_err());
        let cli = Cli::try_parse_from(["topograph", "audit", "--all"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Audit(AuditArgs { all: true, .. }))));
    }
}
