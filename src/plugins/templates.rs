//! Template Engine: the template catalog and template⇄document conversion.
//!
//! Built-in templates are code-defined and read-only. User templates
//! (`custom`) are persisted together with the favorites set and the
//! most-recently-used list. Applying a template never touches the live graph;
//! it returns a [`GraphSnapshot`] for the session to apply.

use crate::core::config::DEFAULT_RECENT_LIMIT;
use crate::core::time;
use crate::plugins::graph::{Edge, GraphSnapshot, Node, NodeData, NodeKind, Position, ShapeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    Audit,
    Compliance,
    OrgChart,
    Risk,
    Supplier,
    Training,
    Process,
    Custom,
}

impl TemplateCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_value(JsonValue::String(raw.trim().to_lowercase())).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Audit => "audit",
            TemplateCategory::Compliance => "compliance",
            TemplateCategory::OrgChart => "org-chart",
            TemplateCategory::Risk => "risk",
            TemplateCategory::Supplier => "supplier",
            TemplateCategory::Training => "training",
            TemplateCategory::Process => "process",
            TemplateCategory::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Complexity {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Complexity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "beginner" => Some(Complexity::Beginner),
            "intermediate" => Some(Complexity::Intermediate),
            "advanced" => Some(Complexity::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Beginner => "beginner",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }
}

/// A node as authored in a template. `kind` may be absent, in which case the
/// shape is resolved when the template is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateNode {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    pub position: Position,
    pub data: NodeData,
}

impl From<&Node> for TemplateNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            kind: Some(node.kind),
            position: node.position,
            data: node.data.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: TemplateCategory,
    pub nodes: Vec<TemplateNode>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
}

impl Template {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<TemplateCategory>,
    pub tags: Option<Vec<String>>,
    pub complexity: Option<Complexity>,
    pub is_premium: Option<bool>,
    pub nodes: Option<Vec<TemplateNode>>,
    pub edges: Option<Vec<Edge>>,
}

/// What survives a reload: user templates and the two id lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedTemplates {
    pub custom_templates: Vec<Template>,
    pub favorites: Vec<String>,
    pub recent_templates: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TemplateEngine {
    builtins: Vec<Template>,
    custom: Vec<Template>,
    favorites: Vec<String>,
    /// Most recent first.
    recents: Vec<String>,
    recent_limit: usize,
    regenerate_ids: bool,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT, true)
    }
}

impl TemplateEngine {
    pub fn new(recent_limit: usize, regenerate_ids: bool) -> Self {
        Self {
            builtins: builtin_templates(),
            custom: Vec::new(),
            favorites: Vec::new(),
            recents: Vec::new(),
            recent_limit: recent_limit.max(1),
            regenerate_ids,
        }
    }

    pub fn from_persisted(
        persisted: PersistedTemplates,
        recent_limit: usize,
        regenerate_ids: bool,
    ) -> Self {
        let mut engine = Self::new(recent_limit, regenerate_ids);
        engine.custom = persisted.custom_templates;
        engine.favorites = persisted.favorites;
        engine.recents = persisted.recent_templates;
        engine.recents.truncate(engine.recent_limit);
        engine
    }

    pub fn to_persisted(&self) -> PersistedTemplates {
        PersistedTemplates {
            custom_templates: self.custom.clone(),
            favorites: self.favorites.clone(),
            recent_templates: self.recents.clone(),
        }
    }

    /// Built-ins first, then user templates in creation order.
    pub fn all(&self) -> impl Iterator<Item = &Template> {
        self.builtins.iter().chain(self.custom.iter())
    }

    pub fn builtins(&self) -> &[Template] {
        &self.builtins
    }

    pub fn custom_templates(&self) -> &[Template] {
        &self.custom
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.all().find(|t| t.id == id)
    }

    pub fn is_builtin(&self, id: &str) -> bool {
        self.builtins.iter().any(|t| t.id == id)
    }

    pub fn recent_ids(&self) -> &[String] {
        &self.recents
    }

    pub fn favorite_ids(&self) -> &[String] {
        &self.favorites
    }

    pub fn recents(&self) -> Vec<&Template> {
        self.recents.iter().filter_map(|id| self.get(id)).collect()
    }

    pub fn favorites(&self) -> Vec<&Template> {
        self.favorites.iter().filter_map(|id| self.get(id)).collect()
    }

    fn record_recent(&mut self, id: &str) {
        self.recents.retain(|r| r != id);
        self.recents.insert(0, id.to_string());
        self.recents.truncate(self.recent_limit);
    }

    /// Record `template` as most recently used and convert it to a graph.
    ///
    /// Node kinds are normalized: `custom` becomes `process`; a node with
    /// neither a kind nor a shape becomes a `shape` node whose shape is a
    /// diamond when its label asks a question and a rectangle otherwise.
    pub fn apply_template(&mut self, template: &Template) -> GraphSnapshot {
        self.record_recent(&template.id);

        let mut nodes: Vec<Node> = template.nodes.iter().map(resolve_node).collect();
        let mut edges = template.edges.clone();

        if self.regenerate_ids {
            let mut remap: FxHashMap<String, String> = FxHashMap::default();
            for node in &mut nodes {
                let fresh = time::prefixed_id("node");
                remap.insert(std::mem::replace(&mut node.id, fresh.clone()), fresh);
            }
            for edge in &mut edges {
                edge.id = time::prefixed_id("edge");
                if let Some(source) = remap.get(&edge.source) {
                    edge.source = source.clone();
                }
                if let Some(target) = remap.get(&edge.target) {
                    edge.target = target.clone();
                }
            }
        }

        GraphSnapshot { nodes, edges }
    }

    /// Look up a template by id and apply it. `None` for an unknown id.
    pub fn apply_template_by_id(&mut self, id: &str) -> Option<(Template, GraphSnapshot)> {
        let template = self.get(id)?.clone();
        let graph = self.apply_template(&template);
        Some((template, graph))
    }

    /// Deep-copy the graph into a new user template and return its id.
    pub fn save_as_template(
        &mut self,
        nodes: &[Node],
        edges: &[Edge],
        name: &str,
        description: &str,
        category: TemplateCategory,
    ) -> String {
        let now = time::now_millis();
        let template = Template {
            id: time::prefixed_id("tpl"),
            name: name.to_string(),
            description: description.to_string(),
            category,
            nodes: nodes.iter().map(TemplateNode::from).collect(),
            edges: edges.to_vec(),
            tags: Vec::new(),
            complexity: Complexity::Intermediate,
            is_premium: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        let id = template.id.clone();
        self.custom.push(template);
        id
    }

    pub fn add_to_favorites(&mut self, id: &str) {
        if !self.favorites.iter().any(|f| f == id) {
            self.favorites.push(id.to_string());
        }
    }

    pub fn remove_from_favorites(&mut self, id: &str) {
        self.favorites.retain(|f| f != id);
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    /// Remove a user template and every reference to it. Built-ins are
    /// read-only and yield `false`.
    pub fn delete_custom_template(&mut self, id: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|t| t.id != id);
        if self.custom.len() == before {
            return false;
        }
        self.favorites.retain(|f| f != id);
        self.recents.retain(|r| r != id);
        true
    }

    /// Shallow-merge into a user template and bump `updated_at`.
    pub fn update_template(&mut self, id: &str, patch: TemplatePatch) -> bool {
        let Some(template) = self.custom.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if let Some(name) = patch.name {
            template.name = name;
        }
        if let Some(description) = patch.description {
            template.description = description;
        }
        if let Some(category) = patch.category {
            template.category = category;
        }
        if let Some(tags) = patch.tags {
            template.tags = tags;
        }
        if let Some(complexity) = patch.complexity {
            template.complexity = complexity;
        }
        if let Some(is_premium) = patch.is_premium {
            template.is_premium = Some(is_premium);
        }
        if let Some(nodes) = patch.nodes {
            template.nodes = nodes;
        }
        if let Some(edges) = patch.edges {
            template.edges = edges;
        }
        template.updated_at = Some(time::now_millis());
        true
    }

    /// Case-insensitive substring match on name, description or any tag.
    pub fn search_templates(&self, query: &str) -> Vec<&Template> {
        let needle = query.trim().to_lowercase();
        self.all().filter(|t| t.matches(&needle)).collect()
    }

    pub fn by_category(&self, category: TemplateCategory) -> Vec<&Template> {
        self.all().filter(|t| t.category == category).collect()
    }

    pub fn by_complexity(&self, complexity: Complexity) -> Vec<&Template> {
        self.all().filter(|t| t.complexity == complexity).collect()
    }

    pub fn export_custom(&self) -> Vec<Template> {
        self.custom.clone()
    }

    /// Append user templates. Ids that collide with the catalog get fresh
    /// ones. Returns the ids as stored.
    pub fn import_custom(&mut self, templates: Vec<Template>) -> Vec<String> {
        let mut taken: FxHashSet<String> = self.all().map(|t| t.id.clone()).collect();
        let mut ids = Vec::with_capacity(templates.len());
        for mut template in templates {
            if taken.contains(&template.id) {
                template.id = time::prefixed_id("tpl");
            }
            taken.insert(template.id.clone());
            ids.push(template.id.clone());
            self.custom.push(template);
        }
        ids
    }
}

fn resolve_node(template_node: &TemplateNode) -> Node {
    let mut data = template_node.data.clone();
    let kind = match template_node.kind {
        Some(NodeKind::Custom) => NodeKind::Process,
        Some(kind) => kind,
        None => {
            if data.shape.is_none() {
                data.shape = Some(infer_shape(&data.label));
            }
            NodeKind::Shape
        }
    };
    Node {
        id: template_node.id.clone(),
        kind,
        position: template_node.position,
        data,
    }
}

fn infer_shape(label: &str) -> ShapeKind {
    if label.contains('?') {
        ShapeKind::Diamond
    } else {
        ShapeKind::Rectangle
    }
}

fn tnode(id: &str, kind: Option<NodeKind>, x: f64, y: f64, label: &str) -> TemplateNode {
    TemplateNode {
        id: id.to_string(),
        kind,
        position: Position::new(x, y),
        data: NodeData::labeled(label),
    }
}

fn tedge(id: &str, source: &str, target: &str, label: Option<&str>) -> Edge {
    let edge = Edge::new(id, source, target);
    match label {
        Some(l) => edge.with_label(l),
        None => edge,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The read-only catalog shipped with the crate.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        Template {
            id: "audit-process-flow".to_string(),
            name: "Internal Audit Process".to_string(),
            description: "End-to-end internal audit from planning to close-out".to_string(),
            category: TemplateCategory::Audit,
            nodes: vec![
                tnode("1", Some(NodeKind::Start), 250.0, 0.0, "Plan Audit"),
                tnode("2", None, 250.0, 100.0, "Notify Auditee"),
                tnode("3", None, 250.0, 200.0, "Fieldwork & Evidence"),
                tnode("4", None, 250.0, 300.0, "Findings identified?"),
                tnode("5", None, 100.0, 420.0, "Draft Report"),
                tnode("6", None, 400.0, 420.0, "Close Audit"),
                tnode("7", Some(NodeKind::End), 250.0, 540.0, "Archive Workpapers"),
            ],
            edges: vec![
                tedge("e1-2", "1", "2", None),
                tedge("e2-3", "2", "3", None),
                tedge("e3-4", "3", "4", None),
                tedge("e4-5", "4", "5", Some("Yes")),
                tedge("e4-6", "4", "6", Some("No")),
                tedge("e5-7", "5", "7", None),
                tedge("e6-7", "6", "7", None),
            ],
            tags: strings(&["audit", "iso 19011", "process"]),
            complexity: Complexity::Intermediate,
            is_premium: None,
            created_at: None,
            updated_at: None,
        },
        Template {
            id: "compliance-org-chart".to_string(),
            name: "Compliance Organization".to_string(),
            description: "Reporting lines for the compliance and audit function".to_string(),
            category: TemplateCategory::OrgChart,
            nodes: vec![
                tnode("1", Some(NodeKind::OrgUnit), 250.0, 0.0, "Board Audit Committee"),
                tnode("2", Some(NodeKind::OrgUnit), 250.0, 120.0, "Chief Compliance Officer"),
                tnode("3", Some(NodeKind::OrgUnit), 50.0, 240.0, "Internal Audit Lead"),
                tnode("4", Some(NodeKind::OrgUnit), 250.0, 240.0, "Risk Manager"),
                tnode("5", Some(NodeKind::OrgUnit), 450.0, 240.0, "Supplier Quality Lead"),
            ],
            edges: vec![
                tedge("e1-2", "1", "2", None),
                tedge("e2-3", "2", "3", None),
                tedge("e2-4", "2", "4", None),
                tedge("e2-5", "2", "5", None),
            ],
            tags: strings(&["org chart", "governance", "reporting"]),
            complexity: Complexity::Beginner,
            is_premium: None,
            created_at: None,
            updated_at: None,
        },
        Template {
            id: "risk-decision-tree".to_string(),
            name: "Risk Treatment Decision Tree".to_string(),
            description: "Route an identified risk to escalation, mitigation or acceptance"
                .to_string(),
            category: TemplateCategory::Risk,
            nodes: vec![
                tnode("1", Some(NodeKind::Start), 250.0, 0.0, "Risk Identified"),
                tnode("2", Some(NodeKind::Decision), 250.0, 120.0, "Likelihood high?"),
                tnode("3", Some(NodeKind::Decision), 100.0, 240.0, "Impact high?"),
                tnode("4", None, 0.0, 360.0, "Escalate to Board"),
                tnode("5", None, 200.0, 360.0, "Mitigate"),
                tnode("6", None, 400.0, 240.0, "Accept & Monitor"),
            ],
            edges: vec![
                tedge("e1-2", "1", "2", None),
                tedge("e2-3", "2", "3", Some("Yes")),
                tedge("e2-6", "2", "6", Some("No")),
                tedge("e3-4", "3", "4", Some("Yes")),
                tedge("e3-5", "3", "5", Some("No")),
            ],
            tags: strings(&["risk", "iso 31000", "decision"]),
            complexity: Complexity::Advanced,
            is_premium: None,
            created_at: None,
            updated_at: None,
        },
        Template {
            id: "supplier-onboarding".to_string(),
            name: "Supplier Onboarding".to_string(),
            description: "Questionnaire-driven supplier assessment and approval".to_string(),
            category: TemplateCategory::Supplier,
            nodes: vec![
                tnode("1", Some(NodeKind::Custom), 250.0, 0.0, "Supplier Request"),
                tnode("2", Some(NodeKind::Custom), 250.0, 100.0, "Send Questionnaire"),
                tnode("3", Some(NodeKind::Custom), 250.0, 200.0, "Score Responses"),
                tnode("4", None, 250.0, 300.0, "Assessment passed?"),
                tnode("5", None, 100.0, 420.0, "Approve Supplier"),
                tnode("6", None, 400.0, 420.0, "Reject Supplier"),
            ],
            edges: vec![
                tedge("e1-2", "1", "2", None),
                tedge("e2-3", "2", "3", None),
                tedge("e3-4", "3", "4", None),
                tedge("e4-5", "4", "5", Some("Pass")),
                tedge("e4-6", "4", "6", Some("Fail")),
            ],
            tags: strings(&["supplier", "vendor", "assessment"]),
            complexity: Complexity::Intermediate,
            is_premium: None,
            created_at: None,
            updated_at: None,
        },
        Template {
            id: "incident-response".to_string(),
            name: "Data Incident Response".to_string(),
            description: "Breach triage with regulator notification branch".to_string(),
            category: TemplateCategory::Compliance,
            nodes: vec![
                tnode("1", Some(NodeKind::Start), 250.0, 0.0, "Incident Detected"),
                tnode("2", None, 250.0, 100.0, "Triage & Contain"),
                tnode("3", None, 250.0, 200.0, "Reportable breach?"),
                tnode("4", None, 100.0, 320.0, "Notify Regulator (72h)"),
                tnode("5", None, 400.0, 320.0, "Internal Log Only"),
                tnode("6", Some(NodeKind::End), 250.0, 440.0, "Lessons Learned"),
            ],
            edges: vec![
                tedge("e1-2", "1", "2", None),
                tedge("e2-3", "2", "3", None),
                tedge("e3-4", "3", "4", Some("Yes")),
                tedge("e3-5", "3", "5", Some("No")),
                tedge("e4-6", "4", "6", None),
                tedge("e5-6", "5", "6", None),
            ],
            tags: strings(&["gdpr", "incident", "breach"]),
            complexity: Complexity::Advanced,
            is_premium: Some(true),
            created_at: None,
            updated_at: None,
        },
    ]
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "templates",
        "version": "0.1.0",
        "description": "Template catalog, favorites and recents",
        "commands": [
            { "name": "template list", "parameters": ["category", "complexity", "favorites", "recent"] },
            { "name": "template search", "parameters": ["query"] },
            { "name": "template show", "parameters": ["id"] },
            { "name": "template apply", "parameters": ["id"] },
            { "name": "template save", "parameters": ["name", "description", "category"] },
            { "name": "template favorite", "parameters": ["id"] },
            { "name": "template unfavorite", "parameters": ["id"] },
            { "name": "template delete", "parameters": ["id"] }
        ],
        "storage": ["auditflow.templates"]
    })
}
