//! Compact text rendering for CLI surfaces.
//!
//! Keeps diagram listings bounded and readable in a terminal.

use crate::plugins::graph::{Edge, Node};

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Join up to `max_items` labels with ` | `, noting how many were left out.
pub fn preview_labels(labels: &[&str], max_items: usize, max_chars: usize) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let shown = labels
        .iter()
        .take(max_items)
        .map(|m| compact_line(m, max_chars))
        .collect::<Vec<_>>()
        .join(" | ");
    if labels.len() > max_items {
        format!("{} (+{} more)", shown, labels.len() - max_items)
    } else {
        shown
    }
}

/// One line per node: id, kind, position, label.
pub fn node_line(node: &Node) -> String {
    format!(
        "{:<32} {:<9} ({:>7.1}, {:>7.1})  {}",
        node.id,
        node.kind.as_str(),
        node.position.x,
        node.position.y,
        compact_line(&node.data.label, 48)
    )
}

/// One line per edge: `id  source -> target [label]`.
pub fn edge_line(edge: &Edge) -> String {
    match &edge.label {
        Some(label) => format!(
            "{:<32} {} -> {} [{}]",
            edge.id,
            edge.source,
            edge.target,
            compact_line(label, 24)
        ),
        None => format!("{:<32} {} -> {}", edge.id, edge.source, edge.target),
    }
}
