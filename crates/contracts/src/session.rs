//! SessionConfig - config loader output
//!
//! Describes one synchronization session: synchronizer tuning, writer
//! options and logging.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::{ContractError, OptionValue, SynchronizerConfig};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is not set
    #[validate(length(min = 1))]
    pub level: String,

    pub format: LogFormat,

    /// Prometheus exporter port, disabled when absent
    #[validate(range(min = 1))]
    pub metrics_port: Option<u16>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SessionConfig {
    #[validate(nested)]
    pub synchronizer: SynchronizerConfig,

    /// Writer options by name (Encoding, DataStorage, PointScale)
    pub output: BTreeMap<String, OptionValue>,

    #[validate(nested)]
    pub logging: LoggingConfig,
}

impl SessionConfig {
    /// Run the declarative field rules
    pub fn check(&self) -> Result<(), ContractError> {
        self.validate()
            .map_err(|e| ContractError::config_validation("session", e.to_string()))
    }
}
