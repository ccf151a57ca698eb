//! Diagram assistant: prompt in, graph out, through a pluggable generator.
//!
//! The generator runs on a worker thread bounded by a timeout. Whatever
//! happens (success, generator error, panic, timeout) the call returns,
//! appends exactly one assistant message and clears the in-flight flag.

use crate::core::error::AuditflowError;
use crate::core::output;
use crate::core::time;
use crate::plugins::graph::{Edge, GraphSnapshot, Node, NodeData, NodeKind, Position};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const FAILURE_REPLY: &str =
    "Sorry, I couldn't generate a diagram for that request. Please try again or rephrase it.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDiagram {
    pub title: String,
    pub graph: GraphSnapshot,
}

/// External diagram generation backend.
pub trait DiagramGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<GeneratedDiagram, AuditflowError>;
}

/// Stand-in backend: waits a fixed delay, then returns a two-node graph.
#[derive(Debug, Clone)]
pub struct PlaceholderGenerator {
    pub delay: Duration,
}

impl PlaceholderGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl DiagramGenerator for PlaceholderGenerator {
    fn generate(&self, prompt: &str) -> Result<GeneratedDiagram, AuditflowError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let start = Node {
            id: time::prefixed_id("node"),
            kind: NodeKind::Start,
            position: Position::new(250.0, 50.0),
            data: NodeData::labeled("Start"),
        };
        let step = Node {
            id: time::prefixed_id("node"),
            kind: NodeKind::Process,
            position: Position::new(250.0, 150.0),
            data: NodeData::labeled("Process"),
        };
        let edge = Edge::connect(&start.id, &step.id);
        Ok(GeneratedDiagram {
            title: format!("AI: {}", output::compact_line(prompt, 40)),
            graph: GraphSnapshot {
                nodes: vec![start, step],
                edges: vec![edge],
            },
        })
    }
}

pub struct Assistant {
    messages: Vec<ChatMessage>,
    in_flight: Arc<AtomicBool>,
    timeout: Duration,
    generator: Arc<dyn DiagramGenerator>,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("messages", &self.messages.len())
            .field("in_flight", &self.is_generating())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Assistant {
    pub fn new(generator: Arc<dyn DiagramGenerator>, timeout: Duration) -> Self {
        Self {
            messages: Vec::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
            timeout,
            generator,
        }
    }

    pub fn placeholder(delay: Duration, timeout: Duration) -> Self {
        Self::new(Arc::new(PlaceholderGenerator::new(delay)), timeout)
    }

    pub fn set_generator(&mut self, generator: Arc<dyn DiagramGenerator>) {
        self.generator = generator;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear_conversation(&mut self) {
        self.messages.clear();
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Shared flag for callers on other threads that want to disable
    /// duplicate submissions while a request runs.
    pub fn in_flight_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.in_flight)
    }

    fn push(&mut self, role: Role, content: String) {
        self.messages.push(ChatMessage {
            role,
            content,
            timestamp: time::now_millis(),
        });
    }

    /// Run the generator for `prompt`. `None` means no graph was produced;
    /// the reason is in the conversation log, never in an error.
    pub fn generate(&mut self, prompt: &str) -> Option<GeneratedDiagram> {
        self.push(Role::User, prompt.to_string());
        self.in_flight.store(true, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel();
        let generator = Arc::clone(&self.generator);
        let owned_prompt = prompt.to_string();
        let spawned = thread::Builder::new()
            .name("auditflow-assistant".to_string())
            .spawn(move || {
                let _ = tx.send(generator.generate(&owned_prompt));
            });

        let outcome = match spawned {
            Ok(_) => match rx.recv_timeout(self.timeout) {
                Ok(Ok(diagram)) => Ok(diagram),
                Ok(Err(e)) => Err(e.to_string()),
                Err(RecvTimeoutError::Timeout) => {
                    Err(format!("timed out after {} ms", self.timeout.as_millis()))
                }
                Err(RecvTimeoutError::Disconnected) => Err("generator aborted".to_string()),
            },
            Err(e) => Err(e.to_string()),
        };

        self.in_flight.store(false, Ordering::SeqCst);

        match outcome {
            Ok(diagram) => {
                self.push(
                    Role::Assistant,
                    format!(
                        "I've created \"{}\" with {} steps. You can refine it on the canvas.",
                        diagram.title,
                        diagram.graph.nodes.len()
                    ),
                );
                Some(diagram)
            }
            Err(reason) => {
                eprintln!("warning: diagram generation failed: {}", reason);
                self.push(Role::Assistant, FAILURE_REPLY.to_string());
                None
            }
        }
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "assistant",
        "version": "0.1.0",
        "description": "Prompt-to-diagram generation behind a pluggable backend",
        "commands": [
            { "name": "generate", "parameters": ["prompt"] }
        ],
        "storage": []
    })
}
