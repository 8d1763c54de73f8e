//! # Config Loader
//!
//! Loading and validation of session configuration and synchronizer input.
//!
//! Responsibilities:
//! - Parse TOML/JSON documents
//! - Validate them beyond what deserialization enforces
//! - Produce `SessionConfig` and `SyncInput`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let session = ConfigLoader::load_from_path(Path::new("session.toml")).unwrap();
//! let input = ConfigLoader::load_input_from_path(Path::new("capture.json")).unwrap();
//! println!("{} groups, tolerance {}", input.groups.len(), session.synchronizer.rate_tolerance);
//! ```

mod parser;
mod validator;

pub use contracts::{SessionConfig, SyncInput};
pub use parser::ConfigFormat;

use contracts::ContractError;
use serde::Serialize;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a session configuration, detecting the format from the extension
    /// (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<SessionConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a session configuration from a string
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<SessionConfig, ContractError> {
        let config: SessionConfig = parser::parse(content, format)?;
        validator::validate_session(&config)?;
        Ok(config)
    }

    /// Load a synchronizer input description (channel groups and platforms)
    pub fn load_input_from_path(path: &Path) -> Result<SyncInput, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_input_from_str(&content, format)
    }

    pub fn load_input_from_str(content: &str, format: ConfigFormat) -> Result<SyncInput, ContractError> {
        let input: SyncInput = parser::parse(content, format)?;
        validator::validate_input(&input)?;
        Ok(input)
    }

    /// Serialize to a TOML string
    pub fn to_toml<T: Serialize>(value: &T) -> Result<String, ContractError> {
        toml::to_string_pretty(value)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize to a JSON string
    pub fn to_json<T: Serialize>(value: &T) -> Result<String, ContractError> {
        serde_json::to_string_pretty(value)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Infer the document format from the file extension
    pub fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}

impl ConfigLoader {
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
