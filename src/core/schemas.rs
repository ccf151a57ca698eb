//! Storage names and schema definitions.
//!
//! Every persisted component lives under one key of a single key-value table
//! in `auditflow.db`. Keys are namespaced so one database can be shared with
//! other tools without collisions.

pub const PROJECT_DIR_NAME: &str = ".auditflow";
pub const AUDITFLOW_DB_NAME: &str = "auditflow.db";
pub const CONFIG_FILE_NAME: &str = "auditflow.toml";
pub const BROKER_LOG_NAME: &str = "broker.events.jsonl";
pub const SESSION_LOG_NAME: &str = "session.events.jsonl";

pub const DIAGRAM_KEY: &str = "auditflow.diagram";
pub const VIEW_KEY: &str = "auditflow.view";
pub const TEMPLATES_KEY: &str = "auditflow.templates";
pub const HISTORY_KEY: &str = "auditflow.history";

pub const KV_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
";
