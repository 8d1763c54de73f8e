//! Codec error types

use contracts::ContractError;
use thiserror::Error;

/// Stream-level error
///
/// Always fatal to the codec call that raised it.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Fewer bytes remain than the value needs
    #[error("stream read error: requested {requested} bytes, {available} available")]
    Read { requested: usize, available: usize },

    /// The sink accepted fewer bytes than requested
    #[error("stream write error: requested {requested} bytes, {written} written")]
    Write { requested: usize, written: usize },

    /// Stream closed or in a failed state
    #[error("stream is closed")]
    Closed,

    /// Seek before the start of the stream or past `i64::MAX`
    #[error("invalid seek to offset {offset}")]
    Seek { offset: i64 },

    /// Value has no 16-bit integer form under the chosen scale
    #[error("value {value} of channel '{channel}' at frame {frame} does not fit integer storage")]
    Range {
        channel: String,
        frame: usize,
        value: f64,
    },

    /// Acquisition does not match the frame layout
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Underlying file error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Codec Result type alias
pub type Result<T> = std::result::Result<T, StreamError>;
