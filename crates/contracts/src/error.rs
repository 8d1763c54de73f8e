//! Layered error definitions
//!
//! Categorized by source: config / model / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Model Errors =====
    /// A channel does not hold the sample count the acquisition requires
    #[error("channel '{channel}' holds {found} samples, expected {expected}")]
    InvariantViolation {
        channel: String,
        expected: usize,
        found: usize,
    },

    /// Metadata dimensions do not describe the stored value count
    #[error("metadata '{label}' dimensions describe {expected} values, found {found}")]
    MetaDataShape {
        label: String,
        expected: usize,
        found: usize,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invariant violation error
    pub fn invariant(channel: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::InvariantViolation {
            channel: channel.into(),
            expected,
            found,
        }
    }
}
