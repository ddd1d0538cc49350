// Tue Jan 20 2026 - Alex

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// How the result line is marked in the runtime's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentinelMode {
    /// Always the literal `QUICJS_RESULT:`
    Fixed,
    /// `QUICJS_RESULT:<token>:` with a fresh token per evaluation
    #[default]
    Unique,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub sentinel: SentinelMode,
    /// Heap limit in bytes for the QuickJS runtime
    pub memory_limit: Option<usize>,
    /// Stack limit in bytes for the QuickJS runtime
    pub max_stack_size: Option<usize>,
    /// Log every composed script at debug level
    pub log_scripts: bool,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            sentinel: SentinelMode::Unique,
            memory_limit: None,
            max_stack_size: None,
            log_scripts: false,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: BridgeConfig = serde_json::from_str(&text)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn with_sentinel(mut self, sentinel: SentinelMode) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_memory_limit(mut self, limit: usize) -> Self {
        self.memory_limit = Some(limit);
        self
    }

    pub fn with_max_stack_size(mut self, size: usize) -> Self {
        self.max_stack_size = Some(size);
        self
    }

    pub fn with_log_scripts(mut self, enabled: bool) -> Self {
        self.log_scripts = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.memory_limit == Some(0) {
            return Err("memory_limit must be greater than 0".to_string());
        }
        if self.max_stack_size == Some(0) {
            return Err("max_stack_size must be greater than 0".to_string());
        }
        Ok(())
    }
}
