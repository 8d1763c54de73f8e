//! Synchronizer configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Synchronizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SynchronizerConfig {
    /// Relative tolerance for rate equality and divisibility tests
    #[validate(range(exclusive_min = 0.0, max = 0.01))]
    pub rate_tolerance: f64,

    /// Upper bound of the common analog frequency search (Hz)
    #[validate(range(exclusive_min = 0.0))]
    pub max_analog_frequency: f64,

    /// Negate the samples of every channel wired to a force platform
    pub flip_force_sign: bool,

    /// Rename force channels after their platform (FX1, F1X1, ...)
    pub relabel_force_channels: bool,
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            rate_tolerance: 1e-6,
            max_analog_frequency: 1_000_000.0,
            flip_force_sign: true,
            relabel_force_channels: false,
        }
    }
}
