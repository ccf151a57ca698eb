//! Shared primitives for auditflow.
//!
//! Storage, configuration, the session journal and small helpers used by
//! every component live here.

pub mod broker;
pub mod config;
pub mod db;
pub mod error;
pub mod journal;
pub mod output;
pub mod schemas;
pub mod store;
pub mod time;
