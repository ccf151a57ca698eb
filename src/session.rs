//! Diagram session: the coordinator for one open document.
//!
//! A `DiagramSession` owns one instance of each component plus the store they
//! persist to. Every history-aware operation follows the same order:
//! snapshot the current graph into history under a label, mutate the graph,
//! then (for template and assistant operations) update project metadata.
//! Each operation ends by persisting the touched components and recording a
//! journal event.
//!
//! Persistence is fire-and-forget: a failed write never fails the operation.
//! It is journaled with status `error` and kept in `last_persist_error`.

use crate::core::config::SessionConfig;
use crate::core::error::AuditflowError;
use crate::core::journal::{self, Journal};
use crate::core::schemas;
use crate::core::store::{KvStore, MemoryStore};
use crate::core::time;
use crate::plugins::assistant::{Assistant, DiagramGenerator};
use crate::plugins::graph::{
    DiagramDocument, Edge, EdgePatch, GraphCore, GraphSnapshot, NewNode, NodePatch, Selection,
};
use crate::plugins::history::{HistoryInfo, HistoryManager, PersistedHistory};
use crate::plugins::templates::{
    PersistedTemplates, Template, TemplateCategory, TemplateEngine, TemplatePatch,
};
use crate::plugins::view::{PersistedView, ViewState};
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Components with their own storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Diagram,
    History,
    View,
    Templates,
}

impl Part {
    pub const ALL: [Part; 4] = [Part::Diagram, Part::History, Part::View, Part::Templates];

    pub fn storage_key(&self) -> &'static str {
        match self {
            Part::Diagram => schemas::DIAGRAM_KEY,
            Part::History => schemas::HISTORY_KEY,
            Part::View => schemas::VIEW_KEY,
            Part::Templates => schemas::TEMPLATES_KEY,
        }
    }
}

pub struct DiagramSession {
    graph: GraphCore,
    history: HistoryManager,
    view: ViewState,
    templates: TemplateEngine,
    assistant: Assistant,
    store: Box<dyn KvStore>,
    journal: Journal,
    config: SessionConfig,
    last_persist_error: Option<String>,
}

impl DiagramSession {
    /// Restore every component from `store`. Missing or unreadable keys fall
    /// back to that component's defaults.
    pub fn open(store: Box<dyn KvStore>, config: SessionConfig) -> Self {
        let mut journal = Journal::new("pending", config.journal.tail_limit);

        let graph = restore_part::<DiagramDocument>(store.as_ref(), &mut journal, Part::Diagram)
            .map(GraphCore::from_document)
            .unwrap_or_default();
        journal.set_document_id(&graph.meta().project_id);

        let history = restore_part::<PersistedHistory>(store.as_ref(), &mut journal, Part::History)
            .map(|p| HistoryManager::from_persisted(p, config.history.max_size))
            .unwrap_or_else(|| HistoryManager::new(config.history.max_size));

        let view = restore_part::<PersistedView>(store.as_ref(), &mut journal, Part::View)
            .map(ViewState::from_persisted)
            .unwrap_or_default();

        let templates =
            restore_part::<PersistedTemplates>(store.as_ref(), &mut journal, Part::Templates)
                .map(|p| {
                    TemplateEngine::from_persisted(
                        p,
                        config.templates.recent_limit,
                        config.templates.regenerate_ids,
                    )
                })
                .unwrap_or_else(|| {
                    TemplateEngine::new(
                        config.templates.recent_limit,
                        config.templates.regenerate_ids,
                    )
                });

        let assistant = Assistant::placeholder(
            Duration::from_millis(config.assistant.simulated_delay_ms),
            Duration::from_millis(config.assistant.timeout_ms),
        );

        journal.record(
            "session.open",
            journal::STATUS_OK,
            Some(format!("store={}", store.kind().as_str())),
        );

        Self {
            graph,
            history,
            view,
            templates,
            assistant,
            store,
            journal,
            config,
            last_persist_error: None,
        }
    }

    /// Fresh session over a [`MemoryStore`] with default config.
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::new()), SessionConfig::default())
    }

    /// Mirror journal events to a JSONL file, starting with the ones recorded
    /// while opening.
    pub fn with_journal_file(mut self, path: &Path) -> Self {
        self.journal = self.journal.with_file_sink(path);
        self
    }

    pub fn set_generator(&mut self, generator: Arc<dyn DiagramGenerator>) {
        self.assistant.set_generator(generator);
    }

    // ----- read access -----

    pub fn graph(&self) -> &GraphCore {
        &self.graph
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        self.graph.selection()
    }

    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_info(&self) -> HistoryInfo {
        self.history.get_history_info()
    }

    // ----- plumbing -----

    fn snapshot(&mut self, action: &str) {
        self.history
            .save_to_history(self.graph.nodes(), self.graph.edges(), action);
    }

    fn persist(&mut self, parts: &[Part]) {
        for part in parts {
            let value = match part {
                Part::Diagram => to_json(&self.graph.document()),
                Part::History => to_json(&self.history.to_persisted()),
                Part::View => to_json(&self.view.to_persisted()),
                Part::Templates => to_json(&self.templates.to_persisted()),
            };
            let key = part.storage_key();
            let result = value.and_then(|v| self.store.set(key, &v));
            if let Err(e) = result {
                let message = format!("{}: {}", key, e);
                self.journal.record(
                    &format!("persist.{}", key),
                    journal::STATUS_ERROR,
                    Some(message.clone()),
                );
                self.last_persist_error = Some(message);
            }
        }
    }

    /// Persist every component.
    pub fn save_all(&mut self) {
        self.persist(&Part::ALL);
        self.journal.record("session.save_all", journal::STATUS_OK, None);
    }

    fn log(&mut self, op: &str, applied: bool, detail: Option<String>) {
        let status = if applied {
            journal::STATUS_OK
        } else {
            journal::STATUS_NOOP
        };
        self.journal.record(op, status, detail);
    }

    // ----- graph operations with history -----

    /// Add a node and return its id. A supplied id that is already taken is
    /// replaced with a generated one.
    pub fn add_node(&mut self, mut partial: NewNode) -> String {
        if let Some(taken) = partial.id.as_deref()
            && self.graph.node(taken).is_some()
        {
            self.journal.record(
                "graph.add_node",
                journal::STATUS_SKIPPED,
                Some(format!("id {} taken; generating a new one", taken)),
            );
            partial.id = None;
        }
        self.snapshot("Add Node");
        let id = self.graph.add_node(partial);
        self.persist(&[Part::History, Part::Diagram]);
        self.log("graph.add_node", true, Some(id.clone()));
        id
    }

    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> bool {
        if self.graph.node(id).is_none() {
            self.log("graph.update_node", false, Some(id.to_string()));
            return false;
        }
        self.snapshot("Update Node");
        self.graph.update_node(id, patch);
        self.persist(&[Part::History, Part::Diagram]);
        self.log("graph.update_node", true, Some(id.to_string()));
        true
    }

    pub fn delete_node(&mut self, id: &str) -> bool {
        if self.graph.node(id).is_none() {
            self.log("graph.delete_node", false, Some(id.to_string()));
            return false;
        }
        self.snapshot("Delete Node");
        self.graph.delete_node(id);
        self.persist(&[Part::History, Part::Diagram]);
        self.log("graph.delete_node", true, Some(id.to_string()));
        true
    }

    /// Add an edge whose endpoints both exist right now. Returns false (and
    /// records nothing in history) otherwise.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if self.graph.node(&edge.source).is_none() || self.graph.node(&edge.target).is_none() {
            self.log(
                "graph.add_edge",
                false,
                Some(format!("{} -> {}", edge.source, edge.target)),
            );
            return false;
        }
        self.snapshot("Add Edge");
        let detail = edge.id.clone();
        self.graph.add_edge(edge);
        self.persist(&[Part::History, Part::Diagram]);
        self.log("graph.add_edge", true, Some(detail));
        true
    }

    /// Connect two nodes with a generated edge id.
    pub fn connect(&mut self, source: &str, target: &str, label: Option<&str>) -> Option<String> {
        let mut edge = Edge::connect(source, target);
        if let Some(label) = label {
            edge = edge.with_label(label);
        }
        let id = edge.id.clone();
        self.add_edge(edge).then_some(id)
    }

    pub fn update_edge(&mut self, id: &str, patch: EdgePatch) -> bool {
        if self.graph.edge(id).is_none() {
            self.log("graph.update_edge", false, Some(id.to_string()));
            return false;
        }
        self.snapshot("Update Edge");
        self.graph.update_edge(id, patch);
        self.persist(&[Part::History, Part::Diagram]);
        self.log("graph.update_edge", true, Some(id.to_string()));
        true
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        if self.graph.edge(id).is_none() {
            self.log("graph.delete_edge", false, Some(id.to_string()));
            return false;
        }
        self.snapshot("Delete Edge");
        self.graph.delete_edge(id);
        self.persist(&[Part::History, Part::Diagram]);
        self.log("graph.delete_edge", true, Some(id.to_string()));
        true
    }

    // ----- pass-through without history -----

    /// Run a graph mutation that should not be undoable (e.g. live drag
    /// updates), then persist the diagram.
    pub fn with_graph<R>(&mut self, op: &str, f: impl FnOnce(&mut GraphCore) -> R) -> R {
        let out = f(&mut self.graph);
        self.persist(&[Part::Diagram]);
        self.log(&format!("graph.{}", op), true, None);
        out
    }

    pub fn with_view<R>(&mut self, op: &str, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let out = f(&mut self.view);
        self.persist(&[Part::View]);
        self.log(&format!("view.{}", op), true, None);
        out
    }

    pub fn with_templates<R>(&mut self, op: &str, f: impl FnOnce(&mut TemplateEngine) -> R) -> R {
        let out = f(&mut self.templates);
        self.persist(&[Part::Templates]);
        self.log(&format!("template.{}", op), true, None);
        out
    }

    pub fn select_node(&mut self, id: &str, multi: bool) {
        self.graph.select_node(id, multi);
    }

    pub fn select_edge(&mut self, id: &str, multi: bool) {
        self.graph.select_edge(id, multi);
    }

    pub fn clear_selection(&mut self) {
        self.graph.clear_selection();
    }

    pub fn select_all(&mut self) {
        self.graph.select_all();
    }

    pub fn set_project_name(&mut self, name: &str) {
        self.graph.set_project_name(name);
        self.persist(&[Part::Diagram]);
        self.log("graph.set_project_name", true, Some(name.to_string()));
    }

    pub fn set_project_description(&mut self, description: &str) {
        self.graph.set_project_description(description);
        self.persist(&[Part::Diagram]);
        self.log("graph.set_project_description", true, None);
    }

    // ----- history -----

    /// Step back one action. The current graph becomes the redo target.
    pub fn undo(&mut self) -> bool {
        let current = self.graph.snapshot();
        match self.history.undo_from(current) {
            Some(entry) => {
                self.graph.restore(entry.graph);
                self.persist(&[Part::History, Part::Diagram]);
                self.log("history.undo", true, Some(entry.action));
                true
            }
            None => {
                self.log("history.undo", false, None);
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.graph.snapshot();
        match self.history.redo_from(current) {
            Some(entry) => {
                self.graph.restore(entry.graph);
                self.persist(&[Part::History, Part::Diagram]);
                self.log("history.redo", true, Some(entry.action));
                true
            }
            None => {
                self.log("history.redo", false, None);
                false
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear_history();
        self.persist(&[Part::History]);
        self.log("history.clear", true, None);
    }

    // ----- composed selection operations -----

    /// Clone every selected node at a fixed offset. Edges follow the nodes:
    /// an edge is copied when both of its endpoints were duplicated, whether
    /// or not the edge itself is selected, so a selected edge that crosses
    /// the selection boundary is not copied. Selects the first copy and
    /// returns the new node ids; empty (and no history entry) when no node is
    /// selected.
    pub fn duplicate_selection(&mut self) -> Vec<String> {
        let selected: Vec<_> = self
            .graph
            .selection()
            .nodes
            .iter()
            .filter_map(|id| self.graph.node(id).cloned())
            .collect();
        if selected.is_empty() {
            self.log("selection.duplicate", false, None);
            return Vec::new();
        }

        let (dx, dy) = (self.config.duplicate.offset_x, self.config.duplicate.offset_y);
        let mut id_map: FxHashMap<String, String> = FxHashMap::default();
        let mut new_nodes = Vec::with_capacity(selected.len());
        for node in selected {
            let mut copy = node.clone();
            copy.id = copy_id(&node.id);
            copy.position = node.position.offset(dx, dy);
            id_map.insert(node.id, copy.id.clone());
            new_nodes.push(copy);
        }

        // Only edges internal to the duplicated node set.
        let new_edges: Vec<Edge> = self
            .graph
            .edges()
            .iter()
            .filter(|e| id_map.contains_key(&e.source) && id_map.contains_key(&e.target))
            .map(|e| {
                let mut copy = e.clone();
                copy.id = copy_id(&e.id);
                copy.source = id_map[&e.source].clone();
                copy.target = id_map[&e.target].clone();
                copy
            })
            .collect();

        self.snapshot("Duplicate Selection");
        let new_ids: Vec<String> = new_nodes.iter().map(|n| n.id.clone()).collect();
        let edge_count = new_edges.len();
        self.graph.set_nodes_with(|nodes| nodes.iter().cloned().chain(new_nodes).collect());
        self.graph.set_edges_with(|edges| edges.iter().cloned().chain(new_edges).collect());
        self.graph.select_node(&new_ids[0], false);

        self.persist(&[Part::History, Part::Diagram]);
        self.log(
            "selection.duplicate",
            true,
            Some(format!("nodes={} edges={}", new_ids.len(), edge_count)),
        );
        new_ids
    }

    /// Remove selected nodes, selected edges and every edge touching a
    /// selected node, then clear the selection. Returns `(nodes, edges)`
    /// removed; nothing selected is a no-op with no history entry.
    pub fn delete_selection(&mut self) -> (usize, usize) {
        if self.graph.selection().is_empty() {
            self.log("selection.delete", false, None);
            return (0, 0);
        }
        let Selection { nodes, edges } = self.graph.selection().clone();
        self.snapshot("Delete Selection");
        let removed = self.graph.remove_many(&nodes, &edges);
        self.graph.clear_selection();
        self.persist(&[Part::History, Part::Diagram]);
        self.log(
            "selection.delete",
            true,
            Some(format!("nodes={} edges={}", removed.0, removed.1)),
        );
        removed
    }

    /// One-way reset: clears the graph and the whole history. Does nothing
    /// unless `confirmed`.
    pub fn reset_with_confirmation(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            self.log("session.reset", false, Some("not confirmed".to_string()));
            return false;
        }
        if !self.graph.is_empty() {
            self.snapshot("Reset Diagram");
        }
        self.graph.reset_diagram();
        self.history.clear_history();
        self.persist(&[Part::History, Part::Diagram]);
        self.log("session.reset", true, None);
        true
    }

    // ----- templates -----

    /// Replace the graph with `template`'s layout and adopt its name and
    /// description as project metadata.
    pub fn apply_template(&mut self, template: &Template) {
        self.snapshot(&format!("Apply Template: {}", template.name));
        let graph = self.templates.apply_template(template);
        self.graph.restore(graph);
        self.graph.clear_selection();
        self.graph.set_project_name(&template.name);
        self.graph.set_project_description(&template.description);
        self.persist(&[Part::History, Part::Diagram, Part::Templates]);
        self.log("template.apply", true, Some(template.id.clone()));
    }

    pub fn apply_template_by_id(&mut self, id: &str) -> bool {
        match self.templates.get(id).cloned() {
            Some(template) => {
                self.apply_template(&template);
                true
            }
            None => {
                self.log("template.apply", false, Some(id.to_string()));
                false
            }
        }
    }

    /// Save the current graph as a user template and return its id.
    pub fn save_as_template(
        &mut self,
        name: &str,
        description: &str,
        category: TemplateCategory,
    ) -> String {
        let id = self.templates.save_as_template(
            self.graph.nodes(),
            self.graph.edges(),
            name,
            description,
            category,
        );
        self.persist(&[Part::Templates]);
        self.log("template.save", true, Some(id.clone()));
        id
    }

    pub fn add_to_favorites(&mut self, id: &str) {
        self.with_templates("favorite", |t| t.add_to_favorites(id));
    }

    pub fn remove_from_favorites(&mut self, id: &str) {
        self.with_templates("unfavorite", |t| t.remove_from_favorites(id));
    }

    pub fn delete_custom_template(&mut self, id: &str) -> bool {
        self.with_templates("delete", |t| t.delete_custom_template(id))
    }

    pub fn update_template(&mut self, id: &str, patch: TemplatePatch) -> bool {
        self.with_templates("update", |t| t.update_template(id, patch))
    }

    // ----- assistant -----

    /// Ask the assistant for a diagram. On success the graph is replaced
    /// (undoably) and the project is renamed after the result; on failure
    /// nothing but the conversation log changes.
    pub fn generate_from_ai(&mut self, prompt: &str) -> bool {
        let Some(diagram) = self.assistant.generate(prompt) else {
            self.journal
                .record("assistant.generate", journal::STATUS_ERROR, None);
            return false;
        };
        self.snapshot("AI Generate");
        self.graph.restore(diagram.graph);
        self.graph.clear_selection();
        self.graph.set_project_name(&diagram.title);
        self.graph.set_project_description(prompt);
        self.persist(&[Part::History, Part::Diagram]);
        self.log("assistant.generate", true, Some(diagram.title));
        true
    }

    // ----- document import/export -----

    pub fn export_document(&self) -> DiagramDocument {
        self.graph.document()
    }

    /// Replace graph and metadata with `doc`. Undo restores the previous
    /// nodes and edges; metadata is not part of history. Documents that
    /// repeat a node or edge id are rejected untouched.
    pub fn import_document(&mut self, doc: DiagramDocument) -> Result<(), AuditflowError> {
        if let Some(id) = doc.duplicate_id() {
            let message = format!("document repeats id '{}'", id);
            self.log("session.import", false, Some(message.clone()));
            return Err(AuditflowError::ValidationError(message));
        }
        self.snapshot("Import Document");
        let project_id = doc.meta.project_id.clone();
        self.graph = GraphCore::from_document(doc);
        self.journal.set_document_id(&project_id);
        self.persist(&[Part::History, Part::Diagram]);
        self.log("session.import", true, Some(project_id));
        Ok(())
    }

    /// Current nodes and edges, deep-copied.
    pub fn snapshot_graph(&self) -> GraphSnapshot {
        self.graph.snapshot()
    }
}

fn copy_id(original: &str) -> String {
    let suffix = time::new_id().to_lowercase();
    format!("{}-copy-{}", original, &suffix[suffix.len() - 8..])
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, AuditflowError> {
    Ok(serde_json::to_value(value)?)
}

fn restore_part<T: DeserializeOwned>(
    store: &dyn KvStore,
    journal: &mut Journal,
    part: Part,
) -> Option<T> {
    let key = part.storage_key();
    let op = format!("restore.{}", key);
    match store.get(key) {
        Ok(Some(value)) => match serde_json::from_value::<T>(value) {
            Ok(parsed) => {
                journal.record(&op, journal::STATUS_OK, None);
                Some(parsed)
            }
            Err(e) => {
                journal.record(&op, journal::STATUS_ERROR, Some(e.to_string()));
                None
            }
        },
        Ok(None) => {
            journal.record(&op, journal::STATUS_SKIPPED, None);
            None
        }
        Err(e) => {
            journal.record(&op, journal::STATUS_ERROR, Some(e.to_string()));
            None
        }
    }
}
