//! History Manager: bounded past/future stacks of graph snapshots.
//!
//! Linear undo model. A new snapshot always clears the redo path, and the
//! past stack keeps at most `max_size` entries, evicting the oldest first.

use crate::core::config::DEFAULT_MAX_HISTORY_SIZE;
use crate::core::time;
use crate::plugins::graph::{Edge, GraphSnapshot, Node};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub graph: GraphSnapshot,
    pub timestamp: u64,
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryInfo {
    pub past_count: usize,
    pub future_count: usize,
    pub total_size: usize,
}

/// Persisted form. Both stacks survive a reload so undo works across CLI runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedHistory {
    pub past: Vec<HistoryEntry>,
    pub future: Vec<HistoryEntry>,
    pub max_size: usize,
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    /// Oldest at the front, most recent at the back.
    past: VecDeque<HistoryEntry>,
    /// Next redo at the front.
    future: VecDeque<HistoryEntry>,
    max_size: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_SIZE)
    }
}

impl HistoryManager {
    pub fn new(max_size: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            max_size: max_size.max(1),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Change the cap, evicting the oldest past entries if needed.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        while self.past.len() > self.max_size {
            self.past.pop_front();
        }
    }

    /// Deep-copy the graph onto the past stack and clear the redo path.
    pub fn save_to_history(&mut self, nodes: &[Node], edges: &[Edge], action: &str) {
        let entry = HistoryEntry {
            graph: GraphSnapshot {
                nodes: nodes.to_vec(),
                edges: edges.to_vec(),
            },
            timestamp: time::now_millis(),
            action: action.to_string(),
        };
        self.future.clear();
        self.push_past(entry);
    }

    fn push_past(&mut self, entry: HistoryEntry) {
        while self.past.len() >= self.max_size {
            self.past.pop_front();
        }
        self.past.push_back(entry);
    }

    /// Pop the latest past entry, move it to the front of the future stack
    /// and return its graph. `None` when there is nothing to undo.
    ///
    /// The entry that moves to `future` is the popped one, not the caller's
    /// current graph. Use [`HistoryManager::undo_from`] to keep the current
    /// graph redoable.
    pub fn undo(&mut self) -> Option<GraphSnapshot> {
        let entry = self.past.pop_back()?;
        let graph = entry.graph.clone();
        self.future.push_front(entry);
        Some(graph)
    }

    /// Symmetric to [`HistoryManager::undo`].
    pub fn redo(&mut self) -> Option<GraphSnapshot> {
        let entry = self.future.pop_front()?;
        let graph = entry.graph.clone();
        self.push_past(entry);
        Some(graph)
    }

    /// Undo that parks `current` on the future stack under the undone
    /// action's label, so a following redo restores exactly `current`.
    pub fn undo_from(&mut self, current: GraphSnapshot) -> Option<HistoryEntry> {
        let entry = self.past.pop_back()?;
        self.future.push_front(HistoryEntry {
            graph: current,
            timestamp: time::now_millis(),
            action: entry.action.clone(),
        });
        Some(entry)
    }

    /// Redo that parks `current` on the past stack.
    pub fn redo_from(&mut self, current: GraphSnapshot) -> Option<HistoryEntry> {
        let entry = self.future.pop_front()?;
        self.push_past(HistoryEntry {
            graph: current,
            timestamp: time::now_millis(),
            action: entry.action.clone(),
        });
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn clear_history(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn get_history_info(&self) -> HistoryInfo {
        HistoryInfo {
            past_count: self.past.len(),
            future_count: self.future.len(),
            total_size: self.past.len() + self.future.len(),
        }
    }

    /// Past action labels, most recent first.
    pub fn labels(&self) -> Vec<&str> {
        self.past.iter().rev().map(|e| e.action.as_str()).collect()
    }

    pub fn past(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.past.iter()
    }

    pub fn future(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.future.iter()
    }

    pub fn to_persisted(&self) -> PersistedHistory {
        PersistedHistory {
            past: self.past.iter().cloned().collect(),
            future: self.future.iter().cloned().collect(),
            max_size: self.max_size,
        }
    }

    /// Restore persisted stacks, re-applying `max_size` from config.
    pub fn from_persisted(persisted: PersistedHistory, max_size: usize) -> Self {
        let mut history = Self {
            past: persisted.past.into(),
            future: persisted.future.into(),
            max_size: max_size.max(1),
        };
        history.set_max_size(max_size);
        history
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "history",
        "version": "0.1.0",
        "description": "Bounded undo/redo snapshot stacks",
        "commands": [
            { "name": "undo" },
            { "name": "redo" },
            { "name": "history", "description": "Show undo/redo stack sizes and labels" }
        ],
        "storage": ["auditflow.history"]
    })
}
