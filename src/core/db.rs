use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub fn db_connect(db_path: &str) -> Result<Connection, error::AuditflowError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::AuditflowError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::AuditflowError::RusqliteError)?;
    Ok(conn)
}

pub fn auditflow_db_path(root: &Path) -> PathBuf {
    root.join(schemas::AUDITFLOW_DB_NAME)
}

pub fn initialize_auditflow_db(root: &Path) -> Result<(), error::AuditflowError> {
    fs::create_dir_all(root).map_err(error::AuditflowError::IoError)?;
    let db_path = auditflow_db_path(root);

    let broker = DbBroker::new(root);
    broker.with_conn(&db_path, "auditflow", "kv.init", |conn| {
        conn.execute(schemas::KV_DB_SCHEMA, [])?;
        Ok(())
    })
}
