//! Subsystem registration: which components persist, and under which key.
//!
//! Adding a persisted component: append one entry to `SUBSYSTEMS`.

use crate::core::{broker, schemas};
use crate::plugins::{assistant, graph, history, templates, view};

pub struct Subsystem {
    pub name: &'static str,
    /// `None` for components that keep nothing across reloads.
    pub storage_key: Option<&'static str>,
    pub schema: fn() -> serde_json::Value,
}

pub const SUBSYSTEMS: &[Subsystem] = &[
    Subsystem {
        name: "graph",
        storage_key: Some(schemas::DIAGRAM_KEY),
        schema: graph::schema,
    },
    Subsystem {
        name: "history",
        storage_key: Some(schemas::HISTORY_KEY),
        schema: history::schema,
    },
    Subsystem {
        name: "view",
        storage_key: Some(schemas::VIEW_KEY),
        schema: view::schema,
    },
    Subsystem {
        name: "templates",
        storage_key: Some(schemas::TEMPLATES_KEY),
        schema: templates::schema,
    },
    Subsystem {
        name: "assistant",
        storage_key: None,
        schema: assistant::schema,
    },
    Subsystem {
        name: "broker",
        storage_key: None,
        schema: broker::schema,
    },
];

pub fn storage_keys() -> Vec<&'static str> {
    SUBSYSTEMS.iter().filter_map(|s| s.storage_key).collect()
}

/// Schema descriptors of every subsystem, as printed by `auditflow capabilities`.
pub fn capabilities() -> serde_json::Value {
    let subsystems: Vec<serde_json::Value> = SUBSYSTEMS.iter().map(|s| (s.schema)()).collect();
    serde_json::json!({
        "name": "auditflow",
        "version": env!("CARGO_PKG_VERSION"),
        "storage_keys": storage_keys(),
        "subsystems": subsystems
    })
}
