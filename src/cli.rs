//! CLI struct definitions for the auditflow command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "auditflow",
    version = env!("CARGO_PKG_VERSION"),
    about = "Local diagram workspace for audit and compliance process maps"
)]
pub(crate) struct Cli {
    /// Output format: 'text' or 'json'.
    #[clap(long, global = true, default_value = "text")]
    pub format: String,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create `.auditflow/` with a database and default config
    Init {
        /// Overwrite an existing auditflow.toml
        #[clap(long)]
        force: bool,
    },
    /// Show project metadata and a summary of the diagram
    Show,
    /// Node operations
    Node(NodeCli),
    /// Edge operations
    Edge(EdgeCli),
    /// Duplicate the given nodes (and edges between them)
    Duplicate(SelectionArgs),
    /// Delete the given nodes and edges, plus edges touching those nodes
    DeleteSelection(SelectionArgs),
    /// Undo the last action
    Undo,
    /// Redo the last undone action
    Redo,
    /// Show undo/redo stacks
    History,
    /// Template catalog
    Template(TemplateCli),
    /// View preferences
    View(ViewCli),
    /// Generate a diagram from a prompt
    Generate {
        #[clap(long)]
        prompt: String,
    },
    /// Clear the diagram and its history. Cannot be undone.
    Reset {
        /// Confirm the reset
        #[clap(long)]
        yes: bool,
    },
    /// Show recent session journal events
    Journal {
        #[clap(long, default_value = "20")]
        limit: usize,
    },
    /// Print the diagram document as JSON
    Export {
        /// Write to a file instead of stdout
        #[clap(long)]
        out: Option<PathBuf>,
    },
    /// Replace the diagram with a JSON document (undoable)
    Import {
        #[clap(long)]
        file: PathBuf,
    },
    /// Print subsystem schemas
    Capabilities,
}

#[derive(clap::Args, Debug)]
pub(crate) struct SelectionArgs {
    /// Node id (repeatable)
    #[clap(long = "node")]
    pub nodes: Vec<String>,
    /// Edge id (repeatable)
    #[clap(long = "edge")]
    pub edges: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub(crate) struct NodeCli {
    #[clap(subcommand)]
    pub command: NodeCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum NodeCommand {
    /// Add a node
    Add {
        #[clap(long)]
        label: Option<String>,
        /// Node kind (process, decision, start, end, ...)
        #[clap(long)]
        kind: Option<String>,
        #[clap(long, allow_hyphen_values = true)]
        x: Option<f64>,
        #[clap(long, allow_hyphen_values = true)]
        y: Option<f64>,
        /// Explicit id (generated when omitted)
        #[clap(long)]
        id: Option<String>,
    },
    /// Update fields of a node
    Update {
        id: String,
        #[clap(long)]
        label: Option<String>,
        #[clap(long)]
        kind: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long, allow_hyphen_values = true)]
        x: Option<f64>,
        #[clap(long, allow_hyphen_values = true)]
        y: Option<f64>,
    },
    /// Delete a node and its edges
    Delete { id: String },
    /// List nodes
    List,
}

#[derive(clap::Args, Debug)]
pub(crate) struct EdgeCli {
    #[clap(subcommand)]
    pub command: EdgeCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum EdgeCommand {
    /// Connect two existing nodes
    Add {
        #[clap(long)]
        source: String,
        #[clap(long)]
        target: String,
        #[clap(long)]
        label: Option<String>,
        #[clap(long)]
        id: Option<String>,
    },
    /// Update an edge
    Update {
        id: String,
        #[clap(long, conflicts_with = "clear_label")]
        label: Option<String>,
        #[clap(long)]
        clear_label: bool,
        #[clap(long)]
        animated: Option<bool>,
    },
    /// Delete an edge
    Delete { id: String },
    /// List edges
    List,
}

#[derive(clap::Args, Debug)]
pub(crate) struct TemplateCli {
    #[clap(subcommand)]
    pub command: TemplateCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum TemplateCommand {
    /// List templates
    List {
        #[clap(long)]
        category: Option<String>,
        #[clap(long)]
        complexity: Option<String>,
        /// Only favorites
        #[clap(long)]
        favorites: bool,
        /// Only recently used, most recent first
        #[clap(long)]
        recent: bool,
    },
    /// Show one template
    Show { id: String },
    /// Replace the diagram with a template
    Apply { id: String },
    /// Save the current diagram as a template
    Save {
        #[clap(long)]
        name: String,
        #[clap(long, default_value = "")]
        description: String,
        #[clap(long, default_value = "custom")]
        category: String,
    },
    /// Mark a template as favorite
    Favorite { id: String },
    /// Remove a template from favorites
    Unfavorite { id: String },
    /// Delete a user template
    Delete { id: String },
    /// Search name, description and tags
    Search { query: String },
}

#[derive(clap::Args, Debug)]
pub(crate) struct ViewCli {
    #[clap(subcommand)]
    pub command: ViewCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ViewCommand {
    /// Show persisted view preferences
    Show,
    /// Change view preferences
    Set {
        #[clap(long)]
        grid: Option<bool>,
        #[clap(long)]
        snap: Option<bool>,
        #[clap(long)]
        grid_size: Option<u32>,
        /// 'vector' or 'raster'
        #[clap(long)]
        render_mode: Option<String>,
        #[clap(long)]
        animations: Option<bool>,
        #[clap(long)]
        autosave: Option<bool>,
        #[clap(long)]
        autosave_interval: Option<u64>,
    },
    /// Switch theme preset (light, dark, high-contrast)
    Theme { name: String },
}
