//! # Sync Engine
//!
//! Acquisition synchronizer for heterogeneous motion-capture channels.
//!
//! Responsibilities:
//! - Resolve inherited group rates and start times
//! - Reconcile marker channels onto one frame clock (padding short ones)
//! - Derive the common analog frequency and upsample analog channels to it
//! - Remap force platforms and emit `FORCE_PLATFORM` metadata
//! - Return a `SyncReport` with recoverable warnings
//!
//! ## Usage Example
//!
//! ```
//! use contracts::{AnalogChannel, ChannelGroup, SyncInput};
//! use sync_engine::Synchronizer;
//!
//! let group = ChannelGroup::new("ADC", 1000.0)
//!     .with_analog(AnalogChannel::new("EMG1", 0.0).with_samples(vec![0.0; 100]));
//! let input = SyncInput { groups: vec![group], platforms: Vec::new() };
//!
//! let report = Synchronizer::default().run(input).unwrap();
//! assert_eq!(report.acquisition.point_frequency, 1000.0);
//! ```

mod engine;
mod error;
mod groups;
mod markers;
mod platform;
mod rate;
mod resample;
mod warnings;

pub use engine::Synchronizer;
pub use error::{MismatchKind, Result, SyncError};
pub use platform::FORCE_PLATFORM;
pub use rate::derive_common_rate;

// Re-export contracts types
pub use contracts::{Severity, SyncInput, SyncReport, SyncWarning, SynchronizerConfig, WarningKind};
