//! Session configuration loaded from `.auditflow/auditflow.toml`.
//!
//! A missing file is not an error: every section falls back to defaults.

use crate::core::error::AuditflowError;
use crate::core::schemas;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;
pub const DEFAULT_RECENT_LIMIT: usize = 10;
pub const DEFAULT_DUPLICATE_OFFSET: f64 = 50.0;
pub const DEFAULT_SIMULATED_DELAY_MS: u64 = 1200;
pub const DEFAULT_ASSISTANT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_JOURNAL_TAIL: usize = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub history: HistoryConfig,
    pub templates: TemplatesConfig,
    pub duplicate: DuplicateConfig,
    pub assistant: AssistantConfig,
    pub journal: JournalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_HISTORY_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TemplatesConfig {
    pub recent_limit: usize,
    /// Give applied template nodes and edges fresh ids so repeated
    /// application never collides with an earlier one.
    pub regenerate_ids: bool,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
            regenerate_ids: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DuplicateConfig {
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            offset_x: DEFAULT_DUPLICATE_OFFSET,
            offset_y: DEFAULT_DUPLICATE_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    pub simulated_delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            simulated_delay_ms: DEFAULT_SIMULATED_DELAY_MS,
            timeout_ms: DEFAULT_ASSISTANT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JournalConfig {
    pub tail_limit: usize,
    pub to_file: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            tail_limit: DEFAULT_JOURNAL_TAIL,
            to_file: true,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), AuditflowError> {
        if self.history.max_size == 0 {
            return Err(AuditflowError::ValidationError(
                "history.max_size must be at least 1".to_string(),
            ));
        }
        if self.templates.recent_limit == 0 {
            return Err(AuditflowError::ValidationError(
                "templates.recent_limit must be at least 1".to_string(),
            ));
        }
        if self.assistant.timeout_ms == 0 {
            return Err(AuditflowError::ValidationError(
                "assistant.timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, AuditflowError> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Load config from `<data_root>/auditflow.toml`.
pub fn load_config(data_root: &Path) -> Result<SessionConfig, AuditflowError> {
    let config_path = data_root.join(schemas::CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(SessionConfig::default());
    }
    let content = fs::read_to_string(&config_path).map_err(AuditflowError::IoError)?;
    SessionConfig::from_toml_str(&content)
}

/// Default config rendered as TOML, written by `auditflow init`.
pub fn default_config_toml() -> String {
    toml::to_string_pretty(&SessionConfig::default()).unwrap_or_default()
}
