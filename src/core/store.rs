//! Key-value persistence for session components.
//!
//! Each component serializes its own persisted subset to a JSON value and
//! stores it under a fixed key (see [`crate::core::schemas`]). Two backends
//! are provided:
//! - [`MemoryStore`]: process-local map, used by tests and embedders
//! - [`SqliteStore`]: a `kv` table in `<root>/auditflow.db`

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error::AuditflowError;
use crate::core::time;
use rusqlite::{OptionalExtension, params};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Backend discriminator, reported by `auditflow capabilities` and the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Sqlite => "sqlite",
        }
    }
}

/// String-keyed JSON document store.
pub trait KvStore {
    fn kind(&self) -> StoreKind;
    fn get(&self, key: &str) -> Result<Option<JsonValue>, AuditflowError>;
    fn set(&mut self, key: &str, value: &JsonValue) -> Result<(), AuditflowError>;
    fn remove(&mut self, key: &str) -> Result<(), AuditflowError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, JsonValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl KvStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    fn get(&self, key: &str) -> Result<Option<JsonValue>, AuditflowError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &JsonValue) -> Result<(), AuditflowError> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), AuditflowError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// SQLite-backed store rooted at a project data directory.
pub struct SqliteStore {
    root: PathBuf,
    broker: DbBroker,
}

impl SqliteStore {
    /// Opens (creating if needed) `<root>/auditflow.db`.
    pub fn open(root: &Path) -> Result<Self, AuditflowError> {
        db::initialize_auditflow_db(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            broker: DbBroker::new(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn db_path(&self) -> PathBuf {
        db::auditflow_db_path(&self.root)
    }
}

impl KvStore for SqliteStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Sqlite
    }

    fn get(&self, key: &str) -> Result<Option<JsonValue>, AuditflowError> {
        let raw: Option<String> =
            self.broker
                .with_conn(&self.db_path(), "auditflow", "kv.get", |conn| {
                    let raw = conn
                        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                            row.get(0)
                        })
                        .optional()?;
                    Ok(raw)
                })?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &JsonValue) -> Result<(), AuditflowError> {
        let text = serde_json::to_string(value)?;
        let now = time::now_millis() as i64;
        self.broker
            .with_conn(&self.db_path(), "auditflow", "kv.set", |conn| {
                conn.execute(
                    "INSERT INTO kv(key, value, updated_at) VALUES(?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    params![key, text, now],
                )?;
                Ok(())
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), AuditflowError> {
        self.broker
            .with_conn(&self.db_path(), "auditflow", "kv.remove", |conn| {
                conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                Ok(())
            })
    }
}
