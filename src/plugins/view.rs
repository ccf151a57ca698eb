//! UI/View state: presentation-only settings with no effect on the document.
//!
//! Setters are plain field replacements. Only configuration preferences are
//! persisted (theme, grid, render mode, animations, autosave); interaction
//! state such as zoom, pan, drag, connect and in-place editing is reset on
//! every reload.

use crate::plugins::graph::Position;
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;
pub const ZOOM_STEP: f64 = 1.2;
pub const DEFAULT_GRID_SIZE: u32 = 20;
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    pub background: String,
    pub surface: String,
    pub node_fill: String,
    pub node_stroke: String,
    pub edge_stroke: String,
    pub text: String,
    pub accent: String,
    pub grid: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: "#ffffff".to_string(),
            surface: "#f8fafc".to_string(),
            node_fill: "#ffffff".to_string(),
            node_stroke: "#334155".to_string(),
            edge_stroke: "#64748b".to_string(),
            text: "#0f172a".to_string(),
            accent: "#2563eb".to_string(),
            grid: "#e2e8f0".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: "#0f172a".to_string(),
            surface: "#1e293b".to_string(),
            node_fill: "#1e293b".to_string(),
            node_stroke: "#94a3b8".to_string(),
            edge_stroke: "#64748b".to_string(),
            text: "#f1f5f9".to_string(),
            accent: "#38bdf8".to_string(),
            grid: "#334155".to_string(),
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast".to_string(),
            background: "#000000".to_string(),
            surface: "#000000".to_string(),
            node_fill: "#000000".to_string(),
            node_stroke: "#ffffff".to_string(),
            edge_stroke: "#ffff00".to_string(),
            text: "#ffffff".to_string(),
            accent: "#00ffff".to_string(),
            grid: "#444444".to_string(),
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "light" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            "high-contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    pub fn preset_names() -> &'static [&'static str] {
        &["light", "dark", "high-contrast"]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSettings {
    pub visible: bool,
    pub snap: bool,
    pub size: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            snap: false,
            size: DEFAULT_GRID_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Vector,
    Raster,
}

impl RenderMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "vector" | "svg" => Some(RenderMode::Vector),
            "raster" | "canvas" => Some(RenderMode::Raster),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveSettings {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Sidebar,
    Properties,
    Minimap,
    TemplateGallery,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panels {
    pub sidebar: bool,
    pub properties: bool,
    pub minimap: bool,
    pub template_gallery: bool,
    pub assistant: bool,
}

impl Default for Panels {
    fn default() -> Self {
        Self {
            sidebar: true,
            properties: true,
            minimap: true,
            template_gallery: false,
            assistant: false,
        }
    }
}

impl Panels {
    fn slot(&mut self, panel: Panel) -> &mut bool {
        match panel {
            Panel::Sidebar => &mut self.sidebar,
            Panel::Properties => &mut self.properties,
            Panel::Minimap => &mut self.minimap,
            Panel::TemplateGallery => &mut self.template_gallery,
            Panel::Assistant => &mut self.assistant,
        }
    }

    pub fn is_open(&self, panel: Panel) -> bool {
        match panel {
            Panel::Sidebar => self.sidebar,
            Panel::Properties => self.properties,
            Panel::Minimap => self.minimap,
            Panel::TemplateGallery => self.template_gallery,
            Panel::Assistant => self.assistant,
        }
    }
}

/// The subset of [`ViewState`] that survives a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedView {
    pub theme: Theme,
    pub grid: GridSettings,
    pub render_mode: RenderMode,
    pub animations_enabled: bool,
    pub autosave: AutosaveSettings,
}

impl Default for PersistedView {
    fn default() -> Self {
        ViewState::default().to_persisted()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub theme: Theme,
    pub grid: GridSettings,
    pub zoom: f64,
    pub pan: Position,
    pub panels: Panels,
    pub editing_node: Option<String>,
    pub dragging: bool,
    pub connecting: bool,
    pub render_mode: RenderMode,
    pub animations_enabled: bool,
    pub autosave: AutosaveSettings,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            grid: GridSettings::default(),
            zoom: 1.0,
            pan: Position::default(),
            panels: Panels::default(),
            editing_node: None,
            dragging: false,
            connecting: false,
            render_mode: RenderMode::default(),
            animations_enabled: true,
            autosave: AutosaveSettings::default(),
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Switch to a built-in theme. Returns false for an unknown preset name.
    pub fn set_theme_preset(&mut self, name: &str) -> bool {
        match Theme::preset(name) {
            Some(theme) => {
                self.theme = theme;
                true
            }
            None => false,
        }
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid.visible = visible;
    }

    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.grid.snap = snap;
    }

    pub fn set_grid_size(&mut self, size: u32) {
        self.grid.size = size;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn set_pan(&mut self, pan: Position) {
        self.pan = pan;
    }

    pub fn reset_viewport(&mut self) {
        self.zoom = 1.0;
        self.pan = Position::default();
    }

    pub fn set_panel(&mut self, panel: Panel, open: bool) {
        *self.panels.slot(panel) = open;
    }

    pub fn toggle_panel(&mut self, panel: Panel) {
        let slot = self.panels.slot(panel);
        *slot = !*slot;
    }

    pub fn set_editing_node(&mut self, node_id: Option<String>) {
        self.editing_node = node_id;
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn set_connecting(&mut self, connecting: bool) {
        self.connecting = connecting;
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    pub fn set_animations_enabled(&mut self, enabled: bool) {
        self.animations_enabled = enabled;
    }

    pub fn set_autosave(&mut self, enabled: bool) {
        self.autosave.enabled = enabled;
    }

    pub fn set_autosave_interval(&mut self, interval_secs: u64) {
        self.autosave.interval_secs = interval_secs;
    }

    pub fn to_persisted(&self) -> PersistedView {
        PersistedView {
            theme: self.theme.clone(),
            grid: self.grid,
            render_mode: self.render_mode,
            animations_enabled: self.animations_enabled,
            autosave: self.autosave,
        }
    }

    /// Rebuild from persisted preferences; ephemeral fields start at defaults.
    pub fn from_persisted(persisted: PersistedView) -> Self {
        Self {
            theme: persisted.theme,
            grid: persisted.grid,
            render_mode: persisted.render_mode,
            animations_enabled: persisted.animations_enabled,
            autosave: persisted.autosave,
            ..Self::default()
        }
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "view",
        "version": "0.1.0",
        "description": "Presentation preferences and interaction state",
        "commands": [
            { "name": "view show" },
            { "name": "view set", "parameters": ["grid", "snap", "grid-size", "render-mode", "animations", "autosave", "autosave-interval"] },
            { "name": "view theme", "parameters": ["name"] }
        ],
        "storage": ["auditflow.view"]
    })
}
