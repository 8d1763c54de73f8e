//! Synchronizer error types

use contracts::ContractError;
use std::fmt;
use thiserror::Error;

/// What disagreed between two marker channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// Sample rate
    Rate,
    /// First frame index, `round(start_time * rate)`
    FirstFrame,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchKind::Rate => f.write_str("rate"),
            MismatchKind::FirstFrame => f.write_str("first frame"),
        }
    }
}

/// Fatal synchronization error; no partial output is produced
#[derive(Debug, Error)]
pub enum SyncError {
    /// Marker channels are not on one clock
    #[error("marker '{channel}' {kind} {found} differs from reference {reference}")]
    RateMismatch {
        channel: String,
        kind: MismatchKind,
        reference: f64,
        found: f64,
    },

    /// No common multiple of the channel rates below the search limit
    #[error("no common analog frequency for rates {rates:?} up to {limit} Hz")]
    UnresolvableCommonRate { rates: Vec<f64>, limit: f64 },

    /// Rate not positive and finite after group inheritance
    #[error("channel '{channel}' has invalid rate {rate}")]
    InvalidRate { channel: String, rate: f64 },

    /// Output breaks the acquisition invariant
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Sync engine Result type alias
pub type Result<T> = std::result::Result<T, SyncError>;
