//! Graph Core: the live node/edge collections of one diagram document.
//!
//! `GraphCore` is the single owner of the document graph and its transient
//! selection. Every operation is total: mutating an unknown id is a no-op,
//! never an error. Edges are not re-validated after creation; `delete_node`
//! cascades to every edge touching the node, which is what keeps the common
//! path free of dangling edges.

use crate::core::time;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub const DEFAULT_NODE_LABEL: &str = "New Node";
pub const DEFAULT_NODE_POSITION: Position = Position { x: 100.0, y: 100.0 };
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Diagram";
pub const DOCUMENT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Node kind tag consumed by the renderer to pick a node component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    #[default]
    Process,
    Decision,
    Start,
    End,
    Shape,
    Text,
    Document,
    OrgUnit,
    Swimlane,
    Custom,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Process => "process",
            NodeKind::Decision => "decision",
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::Shape => "shape",
            NodeKind::Text => "text",
            NodeKind::Document => "document",
            NodeKind::OrgUnit => "org-unit",
            NodeKind::Swimlane => "swimlane",
            NodeKind::Custom => "custom",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_value(JsonValue::String(raw.trim().to_lowercase())).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Rectangle,
    RoundedRectangle,
    Diamond,
    Circle,
    Ellipse,
    Parallelogram,
    Hexagon,
    Cylinder,
    Document,
}

/// Free-form label and style attributes of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attributes this crate does not interpret; kept so they survive a round trip.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Default for NodeData {
    fn default() -> Self {
        Self::labeled(DEFAULT_NODE_LABEL)
    }
}

impl NodeData {
    pub fn labeled(label: &str) -> Self {
        Self {
            label: label.to_string(),
            shape: None,
            fill_color: None,
            stroke_color: None,
            text_color: None,
            font_size: None,
            description: None,
            extra: Map::new(),
        }
    }

    pub fn with_shape(mut self, shape: ShapeKind) -> Self {
        self.shape = Some(shape);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    pub position: Position,
    pub data: NodeData,
}

/// Edge routing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    #[default]
    Default,
    Straight,
    Step,
    SmoothStep,
    Bezier,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
    #[serde(default)]
    pub style: EdgeStyle,
    #[serde(default)]
    pub animated: bool,
}

impl Edge {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            label: None,
            kind: EdgeKind::Default,
            style: EdgeStyle::default(),
            animated: false,
        }
    }

    /// Edge with a generated id.
    pub fn connect(source: &str, target: &str) -> Self {
        Self::new(&time::prefixed_id("edge"), source, target)
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Partial node accepted by [`GraphCore::add_node`]; missing fields get defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNode {
    pub id: Option<String>,
    pub kind: Option<NodeKind>,
    pub position: Option<Position>,
    pub data: Option<NodeData>,
}

impl NewNode {
    pub fn labeled(label: &str) -> Self {
        Self {
            data: Some(NodeData::labeled(label)),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    fn into_node(self) -> Node {
        Node {
            id: self.id.unwrap_or_else(|| time::prefixed_id("node")),
            kind: self.kind.unwrap_or_default(),
            position: self.position.unwrap_or(DEFAULT_NODE_POSITION),
            data: self.data.unwrap_or_default(),
        }
    }
}

/// Shallow patch: each present field replaces the node's field wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub kind: Option<NodeKind>,
    pub position: Option<Position>,
    pub data: Option<NodeData>,
}

impl NodePatch {
    fn apply(self, node: &mut Node) {
        if let Some(kind) = self.kind {
            node.kind = kind;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(data) = self.data {
            node.data = data;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePatch {
    pub source: Option<String>,
    pub target: Option<String>,
    /// `Some(None)` clears the label.
    pub label: Option<Option<String>>,
    pub kind: Option<EdgeKind>,
    pub style: Option<EdgeStyle>,
    pub animated: Option<bool>,
}

impl EdgePatch {
    fn apply(self, edge: &mut Edge) {
        if let Some(source) = self.source {
            edge.source = source;
        }
        if let Some(target) = self.target {
            edge.target = target;
        }
        if let Some(label) = self.label {
            edge.label = label;
        }
        if let Some(kind) = self.kind {
            edge.kind = kind;
        }
        if let Some(style) = self.style {
            edge.style = style;
        }
        if let Some(animated) = self.animated {
            edge.animated = animated;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub project_id: String,
    pub project_name: String,
    pub project_description: String,
    pub last_modified: u64,
    pub version: String,
}

impl Default for DocumentMeta {
    fn default() -> Self {
        Self {
            project_id: time::new_id(),
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            project_description: String::new(),
            last_modified: time::now_millis(),
            version: DOCUMENT_VERSION.to_string(),
        }
    }
}

/// Ordered id sets for the current selection. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Nodes and edges only; the unit captured by history entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Persisted and exported shape of a document. Selection is not part of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(flatten)]
    pub meta: DocumentMeta,
}

impl DiagramDocument {
    /// First node or edge id that appears more than once, if any.
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        if let Some(id) = self
            .nodes
            .iter()
            .map(|n| n.id.as_str())
            .find(|id| !seen.insert(*id))
        {
            return Some(id);
        }
        seen.clear();
        self.edges
            .iter()
            .map(|e| e.id.as_str())
            .find(|id| !seen.insert(*id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphCore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    selection: Selection,
    meta: DocumentMeta,
}

impl GraphCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(doc: DiagramDocument) -> Self {
        Self {
            nodes: doc.nodes,
            edges: doc.edges,
            selection: Selection::default(),
            meta: doc.meta,
        }
    }

    pub fn document(&self) -> DiagramDocument {
        DiagramDocument {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            meta: self.meta.clone(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Edges with `node_id` as source or target.
    pub fn edges_of<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.touches(node_id))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Replace nodes and edges from a snapshot; selection ids that no longer
    /// exist are dropped.
    pub fn restore(&mut self, snapshot: GraphSnapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        self.retain_live_selection();
        self.touch();
    }

    fn touch(&mut self) {
        self.meta.last_modified = time::now_millis();
    }

    fn retain_live_selection(&mut self) {
        let node_ids: FxHashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let edge_ids: FxHashSet<&str> = self.edges.iter().map(|e| e.id.as_str()).collect();
        self.selection
            .nodes
            .retain(|id| node_ids.contains(id.as_str()));
        self.selection
            .edges
            .retain(|id| edge_ids.contains(id.as_str()));
    }

    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
        self.touch();
    }

    /// Replace nodes with a pure transform of the current nodes.
    pub fn set_nodes_with<F>(&mut self, f: F)
    where
        F: FnOnce(&[Node]) -> Vec<Node>,
    {
        let next = f(&self.nodes);
        self.set_nodes(next);
    }

    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
        self.touch();
    }

    pub fn set_edges_with<F>(&mut self, f: F)
    where
        F: FnOnce(&[Edge]) -> Vec<Edge>,
    {
        let next = f(&self.edges);
        self.set_edges(next);
    }

    /// Append a node, filling in id, position and data defaults. Returns the id.
    pub fn add_node(&mut self, partial: NewNode) -> String {
        let node = partial.into_node();
        let id = node.id.clone();
        self.nodes.push(node);
        self.touch();
        id
    }

    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                patch.apply(node);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Remove the node and every edge touching it. Selection follows.
    pub fn delete_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| !e.touches(id));
        self.selection.nodes.retain(|n| n != id);
        self.retain_live_selection();
        self.touch();
        true
    }

    /// Append verbatim. Endpoint existence is the caller's concern.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
        self.touch();
    }

    pub fn update_edge(&mut self, id: &str, patch: EdgePatch) -> bool {
        match self.edges.iter_mut().find(|e| e.id == id) {
            Some(edge) => {
                patch.apply(edge);
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        if self.edges.len() == before {
            return false;
        }
        self.selection.edges.retain(|e| e != id);
        self.touch();
        true
    }

    /// Remove nodes and edges by id in one pass, cascading to any edge that
    /// touches a removed node. Returns `(nodes_removed, edges_removed)`.
    pub fn remove_many(&mut self, node_ids: &[String], edge_ids: &[String]) -> (usize, usize) {
        let doomed_nodes: FxHashSet<&str> = node_ids.iter().map(String::as_str).collect();
        let doomed_edges: FxHashSet<&str> = edge_ids.iter().map(String::as_str).collect();

        let nodes_before = self.nodes.len();
        let edges_before = self.edges.len();
        self.nodes.retain(|n| !doomed_nodes.contains(n.id.as_str()));
        self.edges.retain(|e| {
            !doomed_edges.contains(e.id.as_str())
                && !doomed_nodes.contains(e.source.as_str())
                && !doomed_nodes.contains(e.target.as_str())
        });
        let removed = (
            nodes_before - self.nodes.len(),
            edges_before - self.edges.len(),
        );
        if removed != (0, 0) {
            self.retain_live_selection();
            self.touch();
        }
        removed
    }

    /// Drop edges whose source or target no longer names a node.
    pub fn prune_dangling_edges(&mut self) -> usize {
        let node_ids: FxHashSet<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        let before = self.edges.len();
        self.edges
            .retain(|e| node_ids.contains(&e.source) && node_ids.contains(&e.target));
        let pruned = before - self.edges.len();
        if pruned > 0 {
            self.retain_live_selection();
            self.touch();
        }
        pruned
    }

    /// Single-select replaces both selections; multi-select appends to the
    /// node selection and leaves the edge selection alone.
    pub fn select_node(&mut self, id: &str, multi: bool) {
        if multi {
            if !self.selection.nodes.iter().any(|n| n == id) {
                self.selection.nodes.push(id.to_string());
            }
        } else {
            self.selection.nodes = vec![id.to_string()];
            self.selection.edges.clear();
        }
    }

    pub fn select_edge(&mut self, id: &str, multi: bool) {
        if multi {
            if !self.selection.edges.iter().any(|e| e == id) {
                self.selection.edges.push(id.to_string());
            }
        } else {
            self.selection.edges = vec![id.to_string()];
            self.selection.nodes.clear();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
    }

    pub fn select_all(&mut self) {
        self.selection.nodes = self.nodes.iter().map(|n| n.id.clone()).collect();
        self.selection.edges = self.edges.iter().map(|e| e.id.clone()).collect();
    }

    pub fn set_project_name(&mut self, name: &str) {
        self.meta.project_name = name.to_string();
        self.touch();
    }

    pub fn set_project_description(&mut self, description: &str) {
        self.meta.project_description = description.to_string();
        self.touch();
    }

    pub fn set_version(&mut self, version: &str) {
        self.meta.version = version.to_string();
        self.touch();
    }

    /// Clear nodes, edges and selection. History is untouched.
    pub fn reset_diagram(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.selection = Selection::default();
        self.touch();
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "graph",
        "version": "0.1.0",
        "description": "Live node/edge collections and selection for one diagram document",
        "commands": [
            { "name": "node add", "parameters": ["label", "kind", "x", "y", "id"] },
            { "name": "node update", "parameters": ["id", "label", "kind", "x", "y"] },
            { "name": "node delete", "parameters": ["id"] },
            { "name": "node list" },
            { "name": "edge add", "parameters": ["source", "target", "label", "kind"] },
            { "name": "edge update", "parameters": ["id", "label", "kind", "animated"] },
            { "name": "edge delete", "parameters": ["id"] }
        ],
        "storage": ["auditflow.diagram"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_abc() -> GraphCore {
        let mut g = GraphCore::new();
        g.add_node(NewNode::labeled("A").with_id("a"));
        g.add_node(NewNode::labeled("B").with_id("b"));
        g.add_node(NewNode::labeled("C").with_id("c"));
        g.add_edge(Edge::new("ab", "a", "b"));
        g.add_edge(Edge::new("bc", "b", "c"));
        g.add_edge(Edge::new("ca", "c", "a"));
        g
    }

    #[test]
    fn duplicate_id_checks_nodes_then_edges() {
        let mut doc = graph_abc().document();
        assert_eq!(doc.duplicate_id(), None);

        doc.edges.push(Edge::new("ab", "b", "a"));
        assert_eq!(doc.duplicate_id(), Some("ab"));

        doc.nodes.push(doc.nodes[0].clone());
        assert_eq!(doc.duplicate_id(), Some("a"));
    }

    #[test]
    fn add_node_fills_defaults() {
        let mut g = GraphCore::new();
        let id = g.add_node(NewNode::default());
        let node = g.node(&id).unwrap();
        assert!(id.starts_with("node_"));
        assert_eq!(node.position, Position::new(100.0, 100.0));
        assert_eq!(node.data.label, "New Node");
        assert_eq!(node.kind, NodeKind::Process);
    }

    #[test]
    fn add_node_keeps_supplied_fields() {
        let mut g = GraphCore::new();
        let id = g.add_node(
            NewNode::labeled("Review")
                .with_id("r1")
                .with_kind(NodeKind::Decision)
                .at(-20.5, 1e6),
        );
        assert_eq!(id, "r1");
        let node = g.node("r1").unwrap();
        assert_eq!(node.kind, NodeKind::Decision);
        assert_eq!(node.position, Position::new(-20.5, 1e6));
    }

    #[test]
    fn update_unknown_ids_are_noops() {
        let mut g = graph_abc();
        let before = g.snapshot();
        assert!(!g.update_node("zzz", NodePatch::default()));
        assert!(!g.update_edge("zzz", EdgePatch::default()));
        assert!(!g.delete_node("zzz"));
        assert!(!g.delete_edge("zzz"));
        assert_eq!(g.snapshot(), before);
    }

    #[test]
    fn update_node_shallow_merges() {
        let mut g = graph_abc();
        g.update_node(
            "a",
            NodePatch {
                position: Some(Position::new(5.0, 6.0)),
                ..NodePatch::default()
            },
        );
        let a = g.node("a").unwrap();
        assert_eq!(a.position, Position::new(5.0, 6.0));
        assert_eq!(a.data.label, "A");
    }

    #[test]
    fn update_edge_can_clear_label() {
        let mut g = GraphCore::new();
        g.add_edge(Edge::new("e", "x", "y").with_label("yes"));
        g.update_edge(
            "e",
            EdgePatch {
                label: Some(None),
                animated: Some(true),
                ..EdgePatch::default()
            },
        );
        let e = g.edge("e").unwrap();
        assert_eq!(e.label, None);
        assert!(e.animated);
    }

    #[test]
    fn delete_node_cascades_edges_and_selection() {
        let mut g = graph_abc();
        g.select_node("a", false);
        g.select_node("b", true);
        g.select_edge("ab", true);
        g.select_edge("bc", true);

        assert!(g.delete_node("a"));
        assert!(g.node("a").is_none());
        assert!(g.edges().iter().all(|e| !e.touches("a")));
        assert_eq!(g.edges().len(), 1);
        assert_eq!(g.selection().nodes, vec!["b".to_string()]);
        assert_eq!(g.selection().edges, vec!["bc".to_string()]);
    }

    #[test]
    fn delete_edge_drops_it_from_selection() {
        let mut g = graph_abc();
        g.select_edge("ab", false);
        assert!(g.delete_edge("ab"));
        assert!(g.selection().edges.is_empty());
        assert_eq!(g.nodes().len(), 3);
    }

    #[test]
    fn add_edge_does_not_validate_endpoints() {
        let mut g = GraphCore::new();
        g.add_edge(Edge::new("e", "ghost", "phantom"));
        assert_eq!(g.edges().len(), 1);
        assert_eq!(g.prune_dangling_edges(), 1);
        assert!(g.edges().is_empty());
    }

    #[test]
    fn single_select_replaces_both_kinds() {
        let mut g = graph_abc();
        g.select_node("a", false);
        g.select_edge("ab", true);
        g.select_node("b", false);
        assert_eq!(g.selection().nodes, vec!["b".to_string()]);
        assert!(g.selection().edges.is_empty());

        g.select_edge("bc", false);
        assert!(g.selection().nodes.is_empty());
        assert_eq!(g.selection().edges, vec!["bc".to_string()]);
    }

    #[test]
    fn multi_select_allows_mixed_and_dedupes() {
        let mut g = graph_abc();
        g.select_edge("ab", false);
        g.select_node("a", true);
        g.select_node("a", true);
        g.select_node("c", true);
        assert_eq!(g.selection().nodes, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(g.selection().edges, vec!["ab".to_string()]);
    }

    #[test]
    fn select_all_and_clear() {
        let mut g = graph_abc();
        g.select_all();
        assert_eq!(g.selection().nodes.len(), 3);
        assert_eq!(g.selection().edges.len(), 3);
        g.clear_selection();
        assert!(g.selection().is_empty());
    }

    #[test]
    fn remove_many_cascades_in_one_pass() {
        let mut g = graph_abc();
        g.add_node(NewNode::labeled("D").with_id("d"));
        g.add_edge(Edge::new("cd", "c", "d"));
        let (n, e) = g.remove_many(&["a".to_string()], &["cd".to_string()]);
        assert_eq!(n, 1);
        assert_eq!(e, 3);
        assert_eq!(g.edges().len(), 1);
        assert_eq!(g.edges()[0].id, "bc");
    }

    #[test]
    fn set_with_updater_transforms_current_value() {
        let mut g = graph_abc();
        g.set_nodes_with(|nodes| {
            nodes
                .iter()
                .cloned()
                .map(|mut n| {
                    n.position = n.position.offset(1.0, 1.0);
                    n
                })
                .collect()
        });
        assert!(
            g.nodes()
                .iter()
                .all(|n| n.position == Position::new(101.0, 101.0))
        );
        g.set_edges_with(|edges| edges.iter().filter(|e| e.id != "ca").cloned().collect());
        assert_eq!(g.edges().len(), 2);
    }

    #[test]
    fn metadata_setters_bump_last_modified() {
        let mut g = GraphCore::new();
        g.meta.last_modified = 0;
        g.set_project_name("Q3 Supplier Audit");
        assert_eq!(g.meta().project_name, "Q3 Supplier Audit");
        assert!(g.meta().last_modified > 0);

        g.meta.last_modified = 0;
        g.set_project_description("scope: EU suppliers");
        assert_eq!(g.meta().project_description, "scope: EU suppliers");
        assert!(g.meta().last_modified > 0);
    }

    #[test]
    fn reset_clears_graph_and_selection_only() {
        let mut g = graph_abc();
        g.set_project_name("Keep me");
        g.select_all();
        g.reset_diagram();
        assert!(g.is_empty());
        assert!(g.selection().is_empty());
        assert_eq!(g.meta().project_name, "Keep me");
    }

    #[test]
    fn restore_drops_stale_selection() {
        let mut g = graph_abc();
        let empty = GraphSnapshot::default();
        g.select_all();
        g.restore(empty);
        assert!(g.selection().is_empty());
    }

    #[test]
    fn document_json_uses_type_field_and_camel_case_meta() {
        let mut g = GraphCore::new();
        g.add_node(NewNode::labeled("Start?").with_id("1").with_kind(NodeKind::OrgUnit));
        let json = serde_json::to_value(g.document()).unwrap();
        assert_eq!(json["nodes"][0]["type"], "org-unit");
        assert!(json["lastModified"].is_u64());
        assert!(json["projectName"].is_string());

        let back: DiagramDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back.nodes, g.nodes());
    }

    #[test]
    fn node_data_keeps_unknown_attributes() {
        let raw = serde_json::json!({
            "id": "n",
            "type": "process",
            "position": {"x": 0.0, "y": 0.0},
            "data": {"label": "L", "owner": "audit-team"}
        });
        let node: Node = serde_json::from_value(raw).unwrap();
        assert_eq!(node.data.extra["owner"], "audit-team");
        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["data"]["owner"], "audit-team");
    }

    #[test]
    fn node_kind_parse() {
        assert_eq!(NodeKind::parse("Decision"), Some(NodeKind::Decision));
        assert_eq!(NodeKind::parse("org-unit"), Some(NodeKind::OrgUnit));
        assert_eq!(NodeKind::parse("blob"), None);
    }
}
