//! Session event journal.
//!
//! Every coordinated operation leaves one structured event. The journal keeps
//! a bounded in-memory tail and can mirror events to a JSONL file, the same
//! shape the broker uses for its audit log.

use crate::core::error::AuditflowError;
use crate::core::time;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub const STATUS_OK: &str = "success";
pub const STATUS_NOOP: &str = "noop";
pub const STATUS_SKIPPED: &str = "skipped";
pub const STATUS_ERROR: &str = "error";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEvent {
    pub ts: String,
    pub event_id: String,
    pub document_id: String,
    pub op: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug)]
pub struct Journal {
    document_id: String,
    tail: VecDeque<JournalEvent>,
    tail_limit: usize,
    sink: Option<PathBuf>,
}

impl Journal {
    pub fn new(document_id: &str, tail_limit: usize) -> Self {
        Self {
            document_id: document_id.to_string(),
            tail: VecDeque::new(),
            tail_limit: tail_limit.max(1),
            sink: None,
        }
    }

    /// Mirror every recorded event to `path` (JSONL, append-only). Events
    /// already in the tail are written first.
    pub fn with_file_sink(mut self, path: &Path) -> Self {
        for event in &self.tail {
            if let Err(e) = append_event(path, event) {
                eprintln!("warning: journal write to {} failed: {}", path.display(), e);
                break;
            }
        }
        self.sink = Some(path.to_path_buf());
        self
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn set_document_id(&mut self, document_id: &str) {
        self.document_id = document_id.to_string();
    }

    pub fn record(&mut self, op: &str, status: &str, detail: Option<String>) {
        let event = JournalEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_id(),
            document_id: self.document_id.clone(),
            op: op.to_string(),
            status: status.to_string(),
            detail,
        };

        if let Some(path) = &self.sink
            && let Err(e) = append_event(path, &event)
        {
            eprintln!("warning: journal write to {} failed: {}", path.display(), e);
        }

        if self.tail.len() >= self.tail_limit {
            self.tail.pop_front();
        }
        self.tail.push_back(event);
    }

    pub fn events(&self) -> impl Iterator<Item = &JournalEvent> {
        self.tail.iter()
    }

    pub fn last(&self) -> Option<&JournalEvent> {
        self.tail.back()
    }

    pub fn len(&self) -> usize {
        self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tail.is_empty()
    }
}

fn append_event(path: &Path, event: &JournalEvent) -> Result<(), AuditflowError> {
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "{}", serde_json::to_string(event)?)?;
    Ok(())
}

/// Read the last `limit` events from a JSONL journal. Unparsable lines are skipped.
pub fn read_events(path: &Path, limit: usize) -> Result<Vec<JournalEvent>, AuditflowError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(ev) = serde_json::from_str::<JournalEvent>(&line) {
            events.push(ev);
        }
    }
    let skip = events.len().saturating_sub(limit);
    Ok(events.into_iter().skip(skip).collect())
}
