//! Store configuration (strict parsing)

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_RECENT_WINDOW: usize = 10;
const MAX_RECENT_WINDOW: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Number of records in `recent_executions`
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,

    /// Retained log size; `None` keeps every record
    #[serde(default)]
    pub history_capacity: Option<usize>,

    /// Gas price (wei) in effect at construction and after `reset`
    #[serde(default)]
    pub initial_gas_price: u128,

    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            recent_window: default_recent_window(),
            history_capacity: None,
            initial_gas_price: 0,
            id_prefix: default_id_prefix(),
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_RECENT_WINDOW).contains(&self.recent_window) {
            return Err(ConfigError::OutOfRange {
                field: "recent_window".into(),
                reason: format!("must be between 1 and {}", MAX_RECENT_WINDOW),
            });
        }
        if let Some(capacity) = self.history_capacity {
            if capacity < self.recent_window {
                return Err(ConfigError::OutOfRange {
                    field: "history_capacity".into(),
                    reason: format!(
                        "must be at least recent_window ({}), got {}",
                        self.recent_window, capacity
                    ),
                });
            }
        }
        if self.id_prefix.is_empty()
            || !self
                .id_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::OutOfRange {
                field: "id_prefix".into(),
                reason: "must be non-empty ascii alphanumeric or underscore".into(),
            });
        }
        Ok(())
    }

    /// Builder-style override of the history capacity
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Builder-style override of the starting gas price
    pub fn with_initial_gas_price(mut self, gas_price: u128) -> Self {
        self.initial_gas_price = gas_price;
        self
    }
}

fn default_recent_window() -> usize {
    DEFAULT_RECENT_WINDOW
}

fn default_id_prefix() -> String {
    "exec".into()
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<StoreConfig, ConfigError> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        reason: format!("read {} failed: {e}", path.display()),
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_from_json_str(&s),
        _ => load_from_str(&s),
    }
}

/// Parse YAML and validate
pub fn load_from_str(s: &str) -> Result<StoreConfig, ConfigError> {
    let cfg: StoreConfig = serde_yaml::from_str(s).map_err(|e| ConfigError::Parse {
        reason: format!("invalid yaml: {e}"),
    })?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse JSON and validate
pub fn load_from_json_str(s: &str) -> Result<StoreConfig, ConfigError> {
    let cfg: StoreConfig = serde_json::from_str(s).map_err(|e| ConfigError::Parse {
        reason: format!("invalid json: {e}"),
    })?;
    cfg.validate()?;
    Ok(cfg)
}
