//! Auditflow: a local-first diagram session engine.
//!
//! **Auditflow keeps the state of one flowchart/org-chart document**: the
//! graph, a bounded linear undo/redo history, presentation preferences and a
//! catalog of starter templates. Every component persists to a small
//! key-value store so a session survives restarts.
//!
//! # Architecture
//!
//! ## Components (Plugins)
//!
//! - `graph`: nodes, edges, selection and project metadata
//! - `history`: bounded past/future stacks of graph snapshots
//! - `view`: theme, grid, zoom, panels and interaction flags
//! - `templates`: built-in and user templates, favorites, recents
//! - `assistant`: prompt-to-diagram generation behind a pluggable backend
//!
//! Components never call each other. [`session::DiagramSession`] composes
//! them: snapshot to history, mutate, update metadata, persist, journal.
//!
//! ## Storage
//!
//! - `MemoryStore`: process-local, used by tests and embedders
//! - `SqliteStore` (`<cwd>/.auditflow/auditflow.db`): one `kv` table, all
//!   access serialized through `DbBroker` with an audit log
//!   (`broker.events.jsonl`)
//!
//! # Examples
//!
//! ```bash
//! # Create .auditflow/ in the current directory
//! auditflow init
//!
//! # Start from a template and tweak it
//! auditflow template apply audit-process-flow
//! auditflow node add --label "Escalate?" --kind decision
//! auditflow undo
//!
//! # Machine-readable output
//! auditflow show --format json
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: storage, config, journal and shared helpers
//! - [`plugins`]: component implementations
//! - [`session`]: the coordinator

pub mod core;
pub mod plugins;
pub mod session;
pub mod subsystems;

mod cli;

use crate::cli::{
    Cli, Command, EdgeCommand, NodeCommand, SelectionArgs, TemplateCommand, ViewCommand,
};
use crate::core::{
    config, error,
    error::AuditflowError,
    journal, output, schemas,
    store::SqliteStore,
    time,
};
use crate::plugins::graph::{
    DEFAULT_NODE_LABEL, DEFAULT_NODE_POSITION, Edge, EdgePatch, NewNode, NodeKind, NodePatch,
    Position,
};
use crate::plugins::templates::{Complexity, Template, TemplateCategory};
use crate::plugins::view::{RenderMode, Theme};
use crate::session::DiagramSession;

use clap::Parser;
use colored::Colorize;
use serde_json::{Value as JsonValue, json};
use std::fs;
use std::path::{Path, PathBuf};

/// Output sink for one command: colored text for terminals, a JSON envelope
/// for scripts.
struct Reporter {
    json: bool,
    cmd: String,
}

impl Reporter {
    fn emit(
        &self,
        status: &str,
        extra: JsonValue,
        text: impl FnOnce(),
    ) -> Result<(), AuditflowError> {
        if self.json {
            let envelope = time::command_envelope(&self.cmd, status, extra);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        } else {
            text();
        }
        Ok(())
    }
}

fn data_root(start_dir: &Path) -> PathBuf {
    start_dir.join(schemas::PROJECT_DIR_NAME)
}

fn open_session(root: &Path) -> Result<DiagramSession, AuditflowError> {
    if !root.is_dir() {
        return Err(AuditflowError::NotFound(format!(
            "no {} directory in the current directory; run `auditflow init` first",
            schemas::PROJECT_DIR_NAME
        )));
    }
    let config = config::load_config(root)?;
    let to_file = config.journal.to_file;
    let store = SqliteStore::open(root)?;
    let session = DiagramSession::open(Box::new(store), config);
    Ok(if to_file {
        session.with_journal_file(&root.join(schemas::SESSION_LOG_NAME))
    } else {
        session
    })
}

fn parse_kind(raw: &str) -> Result<NodeKind, AuditflowError> {
    NodeKind::parse(raw)
        .ok_or_else(|| AuditflowError::ValidationError(format!("unknown node kind '{}'", raw)))
}

fn parse_category(raw: &str) -> Result<TemplateCategory, AuditflowError> {
    TemplateCategory::parse(raw).ok_or_else(|| {
        AuditflowError::ValidationError(format!("unknown template category '{}'", raw))
    })
}

fn command_name(command: &Command) -> String {
    let name = match command {
        Command::Init { .. } => "init",
        Command::Show => "show",
        Command::Node(n) => match n.command {
            NodeCommand::Add { .. } => "node.add",
            NodeCommand::Update { .. } => "node.update",
            NodeCommand::Delete { .. } => "node.delete",
            NodeCommand::List => "node.list",
        },
        Command::Edge(e) => match e.command {
            EdgeCommand::Add { .. } => "edge.add",
            EdgeCommand::Update { .. } => "edge.update",
            EdgeCommand::Delete { .. } => "edge.delete",
            EdgeCommand::List => "edge.list",
        },
        Command::Duplicate(_) => "duplicate",
        Command::DeleteSelection(_) => "delete-selection",
        Command::Undo => "undo",
        Command::Redo => "redo",
        Command::History => "history",
        Command::Template(t) => match t.command {
            TemplateCommand::List { .. } => "template.list",
            TemplateCommand::Show { .. } => "template.show",
            TemplateCommand::Apply { .. } => "template.apply",
            TemplateCommand::Save { .. } => "template.save",
            TemplateCommand::Favorite { .. } => "template.favorite",
            TemplateCommand::Unfavorite { .. } => "template.unfavorite",
            TemplateCommand::Delete { .. } => "template.delete",
            TemplateCommand::Search { .. } => "template.search",
        },
        Command::View(v) => match v.command {
            ViewCommand::Show => "view.show",
            ViewCommand::Set { .. } => "view.set",
            ViewCommand::Theme { .. } => "view.theme",
        },
        Command::Generate { .. } => "generate",
        Command::Reset { .. } => "reset",
        Command::Journal { .. } => "journal",
        Command::Export { .. } => "export",
        Command::Import { .. } => "import",
        Command::Capabilities => "capabilities",
    };
    name.to_string()
}

pub fn run() -> Result<(), error::AuditflowError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;
    let root = data_root(&current_dir);
    let out = Reporter {
        json: cli.format == "json",
        cmd: command_name(&cli.command),
    };

    match cli.command {
        Command::Init { force } => run_init(&root, force, &out),
        Command::Capabilities => {
            let caps = subsystems::capabilities();
            out.emit(journal::STATUS_OK, json!({ "capabilities": caps }), || {
                println!("{} v{}", "auditflow".bright_white().bold(), env!("CARGO_PKG_VERSION"));
                for sub in subsystems::SUBSYSTEMS {
                    let key = sub.storage_key.unwrap_or("-");
                    println!("  {} {:<10} {}", "●".bright_green(), sub.name, key.dimmed());
                }
            })
        }
        Command::Journal { limit } => {
            let events = journal::read_events(&root.join(schemas::SESSION_LOG_NAME), limit)?;
            out.emit(journal::STATUS_OK, json!({ "events": events }), || {
                for e in &events {
                    let status = match e.status.as_str() {
                        journal::STATUS_OK => e.status.green(),
                        journal::STATUS_ERROR => e.status.red(),
                        _ => e.status.yellow(),
                    };
                    println!(
                        "{} {:<28} {:<8} {}",
                        e.ts.dimmed(),
                        e.op,
                        status,
                        e.detail.as_deref().unwrap_or("")
                    );
                }
            })
        }
        command => {
            let mut session = open_session(&root)?;
            let result = dispatch(&mut session, command, &out);
            if let Some(err) = session.last_persist_error() {
                eprintln!("{} {}", "warning: failed to save:".yellow(), err);
            }
            result
        }
    }
}

fn run_init(root: &Path, force: bool, out: &Reporter) -> Result<(), AuditflowError> {
    fs::create_dir_all(root)?;
    let config_path = root.join(schemas::CONFIG_FILE_NAME);
    let wrote_config = force || !config_path.exists();
    if wrote_config {
        fs::write(&config_path, config::default_config_toml())?;
    }
    let mut session = open_session(root)?;
    session.save_all();
    let doc = session.export_document();
    out.emit(
        journal::STATUS_OK,
        json!({
            "root": root.display().to_string(),
            "config_written": wrote_config,
            "project_id": doc.meta.project_id,
        }),
        || {
            println!("  {} Initialized {}", "▸".bright_green(), root.display());
            if wrote_config {
                println!(
                    "    {} {}",
                    "●".bright_green(),
                    schemas::CONFIG_FILE_NAME.bright_white()
                );
            }
            println!("    {} {}", "●".bright_green(), schemas::AUDITFLOW_DB_NAME.bright_white());
        },
    )
}

fn dispatch(
    session: &mut DiagramSession,
    command: Command,
    out: &Reporter,
) -> Result<(), AuditflowError> {
    match command {
        Command::Show => {
            let doc = session.export_document();
            let info = session.history_info();
            out.emit(
                journal::STATUS_OK,
                json!({ "document": doc, "history": info }),
                || {
                    println!("{}", doc.meta.project_name.bright_white().bold());
                    if !doc.meta.project_description.is_empty() {
                        println!("  {}", output::compact_line(&doc.meta.project_description, 72));
                    }
                    println!(
                        "  nodes: {}  edges: {}  undo: {}  redo: {}",
                        doc.nodes.len(),
                        doc.edges.len(),
                        info.past_count,
                        info.future_count
                    );
                    for n in &doc.nodes {
                        println!("  {}", output::node_line(n));
                    }
                    for e in &doc.edges {
                        println!("  {}", output::edge_line(e));
                    }
                },
            )
        }
        Command::Node(node_cli) => run_node(session, node_cli.command, out),
        Command::Edge(edge_cli) => run_edge(session, edge_cli.command, out),
        Command::Duplicate(args) => {
            select(session, &args)?;
            let ids = session.duplicate_selection();
            let status = if ids.is_empty() { journal::STATUS_NOOP } else { journal::STATUS_OK };
            out.emit(status, json!({ "node_ids": ids }), || {
                if ids.is_empty() {
                    println!("Nothing selected.");
                } else {
                    println!("Duplicated {} node(s): {}", ids.len(), ids.join(", "));
                }
            })
        }
        Command::DeleteSelection(args) => {
            select(session, &args)?;
            let (nodes, edges) = session.delete_selection();
            let status = if nodes + edges == 0 { journal::STATUS_NOOP } else { journal::STATUS_OK };
            out.emit(
                status,
                json!({ "nodes_removed": nodes, "edges_removed": edges }),
                || println!("Removed {} node(s) and {} edge(s).", nodes, edges),
            )
        }
        Command::Undo => {
            let applied = session.undo();
            history_result(session, out, applied, "Undid", "Nothing to undo.")
        }
        Command::Redo => {
            let applied = session.redo();
            history_result(session, out, applied, "Redid", "Nothing to redo.")
        }
        Command::History => {
            let history = session.history();
            let past: Vec<&str> = history.labels();
            let future: Vec<&str> = history.future().map(|e| e.action.as_str()).collect();
            out.emit(
                journal::STATUS_OK,
                json!({
                    "info": history.get_history_info(),
                    "max_size": history.max_size(),
                    "past": past,
                    "future": future,
                }),
                || {
                    println!(
                        "undo ({}/{}): {}",
                        past.len(),
                        history.max_size(),
                        output::preview_labels(&past, 5, 40)
                    );
                    println!("redo ({}): {}", future.len(), output::preview_labels(&future, 5, 40));
                },
            )
        }
        Command::Template(template_cli) => run_template(session, template_cli.command, out),
        Command::View(view_cli) => run_view(session, view_cli.command, out),
        Command::Generate { prompt } => {
            let applied = session.generate_from_ai(&prompt);
            let reply = session
                .assistant()
                .messages()
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            let status = if applied { journal::STATUS_OK } else { journal::STATUS_ERROR };
            let doc = session.export_document();
            out.emit(
                status,
                json!({
                    "applied": applied,
                    "reply": reply,
                    "project_name": doc.meta.project_name,
                }),
                || println!("{}", reply),
            )?;
            if applied {
                Ok(())
            } else {
                Err(AuditflowError::ValidationError("diagram generation failed".to_string()))
            }
        }
        Command::Reset { yes } => {
            if !yes {
                return Err(AuditflowError::ValidationError(
                    "reset clears the diagram and its history; pass --yes to confirm".to_string(),
                ));
            }
            session.reset_with_confirmation(true);
            out.emit(journal::STATUS_OK, json!({}), || {
                println!("Diagram reset. History cleared.")
            })
        }
        Command::Export { out: path } => {
            let doc = session.export_document();
            let rendered = serde_json::to_string_pretty(&doc)?;
            match path {
                Some(path) => {
                    fs::write(&path, rendered)?;
                    out.emit(
                        journal::STATUS_OK,
                        json!({ "path": path.display().to_string() }),
                        || println!("Exported to {}", path.display()),
                    )
                }
                None => {
                    println!("{}", rendered);
                    Ok(())
                }
            }
        }
        Command::Import { file } => {
            let raw = fs::read_to_string(&file)?;
            let doc = serde_json::from_str(&raw)?;
            session.import_document(doc)?;
            let g = session.graph();
            let (nodes, edges) = (g.nodes().len(), g.edges().len());
            out.emit(
                journal::STATUS_OK,
                json!({ "nodes": nodes, "edges": edges }),
                || println!("Imported {} node(s) and {} edge(s).", nodes, edges),
            )
        }
        Command::Init { .. } | Command::Capabilities | Command::Journal { .. } => Ok(()),
    }
}

fn select(session: &mut DiagramSession, args: &SelectionArgs) -> Result<(), AuditflowError> {
    session.clear_selection();
    for id in &args.nodes {
        if session.graph().node(id).is_none() {
            return Err(AuditflowError::NotFound(format!("node '{}'", id)));
        }
        session.select_node(id, true);
    }
    for id in &args.edges {
        if session.graph().edge(id).is_none() {
            return Err(AuditflowError::NotFound(format!("edge '{}'", id)));
        }
        session.select_edge(id, true);
    }
    Ok(())
}

fn history_result(
    session: &DiagramSession,
    out: &Reporter,
    applied: bool,
    verb: &str,
    empty: &str,
) -> Result<(), AuditflowError> {
    let info = session.history_info();
    let action = session
        .journal()
        .last()
        .and_then(|e| e.detail.clone())
        .unwrap_or_default();
    let status = if applied { journal::STATUS_OK } else { journal::STATUS_NOOP };
    out.emit(status, json!({ "action": action, "history": info }), || {
        if applied {
            println!("{} \"{}\"", verb, action);
        } else {
            println!("{}", empty);
        }
    })
}

fn run_node(
    session: &mut DiagramSession,
    command: NodeCommand,
    out: &Reporter,
) -> Result<(), AuditflowError> {
    match command {
        NodeCommand::Add { label, kind, x, y, id } => {
            let mut partial = NewNode::labeled(label.as_deref().unwrap_or(DEFAULT_NODE_LABEL));
            if let Some(kind) = kind {
                partial = partial.with_kind(parse_kind(&kind)?);
            }
            if let Some(id) = id {
                if session.graph().node(&id).is_some() {
                    return Err(AuditflowError::ValidationError(format!(
                        "node '{}' already exists",
                        id
                    )));
                }
                partial = partial.with_id(&id);
            }
            if x.is_some() || y.is_some() {
                partial = partial.at(
                    x.unwrap_or(DEFAULT_NODE_POSITION.x),
                    y.unwrap_or(DEFAULT_NODE_POSITION.y),
                );
            }
            let id = session.add_node(partial);
            out.emit(journal::STATUS_OK, json!({ "id": id }), || {
                println!("Node added: {}", id)
            })
        }
        NodeCommand::Update { id, label, kind, description, x, y } => {
            let Some(current) = session.graph().node(&id).cloned() else {
                return Err(AuditflowError::NotFound(format!("node '{}'", id)));
            };
            let mut patch = NodePatch::default();
            if let Some(kind) = kind {
                patch.kind = Some(parse_kind(&kind)?);
            }
            if label.is_some() || description.is_some() {
                let mut data = current.data.clone();
                if let Some(label) = label {
                    data.label = label;
                }
                if description.is_some() {
                    data.description = description;
                }
                patch.data = Some(data);
            }
            if x.is_some() || y.is_some() {
                patch.position = Some(Position::new(
                    x.unwrap_or(current.position.x),
                    y.unwrap_or(current.position.y),
                ));
            }
            session.update_node(&id, patch);
            out.emit(journal::STATUS_OK, json!({ "id": id }), || {
                println!("Node updated: {}", id)
            })
        }
        NodeCommand::Delete { id } => {
            let edges_removed = session.graph().edges_of(&id).count();
            if !session.delete_node(&id) {
                return Err(AuditflowError::NotFound(format!("node '{}'", id)));
            }
            out.emit(
                journal::STATUS_OK,
                json!({ "id": id, "edges_removed": edges_removed }),
                || println!("Node deleted: {} ({} edge(s) removed)", id, edges_removed),
            )
        }
        NodeCommand::List => {
            let nodes = session.graph().nodes();
            out.emit(journal::STATUS_OK, json!({ "nodes": nodes }), || {
                for n in nodes {
                    println!("{}", output::node_line(n));
                }
            })
        }
    }
}

fn run_edge(
    session: &mut DiagramSession,
    command: EdgeCommand,
    out: &Reporter,
) -> Result<(), AuditflowError> {
    match command {
        EdgeCommand::Add { source, target, label, id } => {
            let mut edge = match &id {
                Some(id) => Edge::new(id, &source, &target),
                None => Edge::connect(&source, &target),
            };
            if let Some(label) = &label {
                edge = edge.with_label(label);
            }
            let id = edge.id.clone();
            if !session.add_edge(edge) {
                return Err(AuditflowError::NotFound(format!(
                    "edge endpoints must exist: '{}' -> '{}'",
                    source, target
                )));
            }
            out.emit(journal::STATUS_OK, json!({ "id": id }), || {
                println!("Edge added: {}", id)
            })
        }
        EdgeCommand::Update { id, label, clear_label, animated } => {
            let patch = EdgePatch {
                label: if clear_label { Some(None) } else { label.map(Some) },
                animated,
                ..EdgePatch::default()
            };
            if !session.update_edge(&id, patch) {
                return Err(AuditflowError::NotFound(format!("edge '{}'", id)));
            }
            out.emit(journal::STATUS_OK, json!({ "id": id }), || {
                println!("Edge updated: {}", id)
            })
        }
        EdgeCommand::Delete { id } => {
            if !session.delete_edge(&id) {
                return Err(AuditflowError::NotFound(format!("edge '{}'", id)));
            }
            out.emit(journal::STATUS_OK, json!({ "id": id }), || {
                println!("Edge deleted: {}", id)
            })
        }
        EdgeCommand::List => {
            let edges = session.graph().edges();
            out.emit(journal::STATUS_OK, json!({ "edges": edges }), || {
                for e in edges {
                    println!("{}", output::edge_line(e));
                }
            })
        }
    }
}

fn template_line(t: &Template, favorite: bool) -> String {
    let star = if favorite { "★" } else { " " };
    format!(
        "{} {:<28} {:<11} {:<12} {}",
        star,
        t.id,
        t.category.as_str(),
        t.complexity.as_str(),
        output::compact_line(&t.name, 40)
    )
}

fn run_template(
    session: &mut DiagramSession,
    command: TemplateCommand,
    out: &Reporter,
) -> Result<(), AuditflowError> {
    match command {
        TemplateCommand::List { category, complexity, favorites, recent } => {
            let engine = session.templates();
            let category = category.as_deref().map(parse_category).transpose()?;
            let complexity = match complexity.as_deref() {
                Some(raw) => Some(Complexity::parse(raw).ok_or_else(|| {
                    AuditflowError::ValidationError(format!("unknown complexity '{}'", raw))
                })?),
                None => None,
            };
            let base: Vec<&Template> = if recent {
                engine.recents()
            } else if favorites {
                engine.favorites()
            } else {
                engine.all().collect()
            };
            let listed: Vec<&Template> = base
                .into_iter()
                .filter(|t| category.is_none_or(|c| t.category == c))
                .filter(|t| complexity.is_none_or(|c| t.complexity == c))
                .collect();
            out.emit(journal::STATUS_OK, json!({ "templates": listed }), || {
                for t in &listed {
                    println!("{}", template_line(t, engine.is_favorite(&t.id)));
                }
            })
        }
        TemplateCommand::Show { id } => {
            let engine = session.templates();
            let t = engine
                .get(&id)
                .ok_or_else(|| AuditflowError::NotFound(format!("template '{}'", id)))?;
            out.emit(journal::STATUS_OK, json!({ "template": t }), || {
                println!("{}", t.name.bright_white().bold());
                println!("  {}", t.description);
                println!(
                    "  category: {}  complexity: {}  nodes: {}  edges: {}",
                    t.category.as_str(),
                    t.complexity.as_str(),
                    t.nodes.len(),
                    t.edges.len()
                );
                if !t.tags.is_empty() {
                    println!("  tags: {}", t.tags.join(", "));
                }
            })
        }
        TemplateCommand::Apply { id } => {
            if !session.apply_template_by_id(&id) {
                return Err(AuditflowError::NotFound(format!("template '{}'", id)));
            }
            let g = session.graph();
            let (nodes, edges) = (g.nodes().len(), g.edges().len());
            let name = g.meta().project_name.clone();
            out.emit(
                journal::STATUS_OK,
                json!({ "id": id, "project_name": name, "nodes": nodes, "edges": edges }),
                || println!("Applied \"{}\": {} node(s), {} edge(s)", name, nodes, edges),
            )
        }
        TemplateCommand::Save { name, description, category } => {
            let category = parse_category(&category)?;
            let id = session.save_as_template(&name, &description, category);
            out.emit(journal::STATUS_OK, json!({ "id": id }), || {
                println!("Template saved: {}", id)
            })
        }
        TemplateCommand::Favorite { id } => {
            if session.templates().get(&id).is_none() {
                return Err(AuditflowError::NotFound(format!("template '{}'", id)));
            }
            session.add_to_favorites(&id);
            out.emit(journal::STATUS_OK, json!({ "id": id }), || {
                println!("Added to favorites: {}", id)
            })
        }
        TemplateCommand::Unfavorite { id } => {
            session.remove_from_favorites(&id);
            out.emit(journal::STATUS_OK, json!({ "id": id }), || {
                println!("Removed from favorites: {}", id)
            })
        }
        TemplateCommand::Delete { id } => {
            if session.templates().is_builtin(&id) {
                return Err(AuditflowError::ValidationError(format!(
                    "'{}' is a built-in template and cannot be deleted",
                    id
                )));
            }
            if !session.delete_custom_template(&id) {
                return Err(AuditflowError::NotFound(format!("template '{}'", id)));
            }
            out.emit(journal::STATUS_OK, json!({ "id": id }), || {
                println!("Template deleted: {}", id)
            })
        }
        TemplateCommand::Search { query } => {
            let engine = session.templates();
            let found = engine.search_templates(&query);
            out.emit(journal::STATUS_OK, json!({ "templates": found }), || {
                for t in &found {
                    println!("{}", template_line(t, engine.is_favorite(&t.id)));
                }
            })
        }
    }
}

fn run_view(
    session: &mut DiagramSession,
    command: ViewCommand,
    out: &Reporter,
) -> Result<(), AuditflowError> {
    match command {
        ViewCommand::Show => {
            let prefs = session.view().to_persisted();
            out.emit(journal::STATUS_OK, json!({ "view": prefs }), || {
                println!("theme:       {}", prefs.theme.name);
                println!(
                    "grid:        visible={} snap={} size={}",
                    prefs.grid.visible, prefs.grid.snap, prefs.grid.size
                );
                println!("render mode: {:?}", prefs.render_mode);
                println!("animations:  {}", prefs.animations_enabled);
                println!(
                    "autosave:    {} every {}s",
                    prefs.autosave.enabled, prefs.autosave.interval_secs
                );
            })
        }
        ViewCommand::Set {
            grid,
            snap,
            grid_size,
            render_mode,
            animations,
            autosave,
            autosave_interval,
        } => {
            let render_mode = match render_mode.as_deref() {
                Some(raw) => Some(RenderMode::parse(raw).ok_or_else(|| {
                    AuditflowError::ValidationError(format!("unknown render mode '{}'", raw))
                })?),
                None => None,
            };
            session.with_view("set", |v| {
                if let Some(visible) = grid {
                    v.set_grid_visible(visible);
                }
                if let Some(snap) = snap {
                    v.set_snap_to_grid(snap);
                }
                if let Some(size) = grid_size {
                    v.set_grid_size(size);
                }
                if let Some(mode) = render_mode {
                    v.set_render_mode(mode);
                }
                if let Some(enabled) = animations {
                    v.set_animations_enabled(enabled);
                }
                if let Some(enabled) = autosave {
                    v.set_autosave(enabled);
                }
                if let Some(secs) = autosave_interval {
                    v.set_autosave_interval(secs);
                }
            });
            let prefs = session.view().to_persisted();
            out.emit(journal::STATUS_OK, json!({ "view": prefs }), || {
                println!("View preferences saved.")
            })
        }
        ViewCommand::Theme { name } => {
            if !session.with_view("theme", |v| v.set_theme_preset(&name)) {
                return Err(AuditflowError::ValidationError(format!(
                    "unknown theme '{}' (expected one of: {})",
                    name,
                    Theme::preset_names().join(", ")
                )));
            }
            out.emit(journal::STATUS_OK, json!({ "theme": name }), || {
                println!("Theme set: {}", name)
            })
        }
    }
}
