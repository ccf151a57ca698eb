//! Diagram components.
//!
//! Each component owns its state and exposes a `schema()` descriptor. None of
//! them call each other; composition happens in [`crate::session`].

pub mod assistant;
pub mod graph;
pub mod history;
pub mod templates;
pub mod view;
