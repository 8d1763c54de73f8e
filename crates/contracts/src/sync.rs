//! Synchronizer input and output
//!
//! `SyncInput` is what a format reader hands over; `SyncReport` is what the
//! synchronizer returns: one `Acquisition` plus every recoverable anomaly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Acquisition, AnalogChannel, MarkerChannel, PlatformDescriptor};

/// Channels sharing one nominal rate and start time
///
/// A channel whose own rate is 0 inherits both rate and start time from
/// its group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelGroup {
    /// Group name, used in diagnostics only
    #[serde(default)]
    pub name: String,

    /// Nominal rate (Hz)
    #[serde(default)]
    pub rate: f64,

    /// Nominal start time (seconds)
    #[serde(default)]
    pub start_time: f64,

    #[serde(default)]
    pub markers: Vec<MarkerChannel>,

    #[serde(default)]
    pub analogs: Vec<AnalogChannel>,
}

impl ChannelGroup {
    pub fn new(name: impl Into<String>, rate: f64) -> Self {
        Self {
            name: name.into(),
            rate,
            ..Default::default()
        }
    }

    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_marker(mut self, marker: MarkerChannel) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_analog(mut self, analog: AnalogChannel) -> Self {
        self.analogs.push(analog);
        self
    }

    /// Effective (rate, start_time) of a channel in this group
    pub fn timing_of(&self, rate: f64, start_time: f64) -> (f64, f64) {
        if rate > 0.0 {
            (rate, start_time)
        } else {
            (self.rate, self.start_time)
        }
    }
}

/// Complete synchronizer input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncInput {
    #[serde(default)]
    pub groups: Vec<ChannelGroup>,

    #[serde(default)]
    pub platforms: Vec<PlatformDescriptor>,
}

impl SyncInput {
    pub fn marker_count(&self) -> usize {
        self.groups.iter().map(|g| g.markers.len()).sum()
    }

    pub fn analog_count(&self) -> usize {
        self.groups.iter().map(|g| g.analogs.len()).sum()
    }
}

/// Warning severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// Recoverable anomaly category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Marker channel padded at the tail with occluded frames
    FramePadded,
    /// Common rate is not an exact multiple of a channel rate
    NonExactSubsample,
    /// Analog channel held or truncated to the target length
    AnalogLengthAdjusted,
    /// Analog start time differs from the marker reference
    AnalogStartOffset,
    /// Platform manufacturer not recognised, platform skipped
    UnknownPlatformType,
    /// Platform channel count does not match its layout, platform skipped
    PlatformChannelCount,
    /// Platform hardware id not found among analog channels
    PlatformChannelMissing,
}

impl WarningKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            WarningKind::FramePadded => "frame_padded",
            WarningKind::NonExactSubsample => "non_exact_subsample",
            WarningKind::AnalogLengthAdjusted => "analog_length_adjusted",
            WarningKind::AnalogStartOffset => "analog_start_offset",
            WarningKind::UnknownPlatformType => "unknown_platform_type",
            WarningKind::PlatformChannelCount => "platform_channel_count",
            WarningKind::PlatformChannelMissing => "platform_channel_missing",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recoverable anomaly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncWarning {
    pub severity: Severity,
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.kind, self.message)
    }
}

/// Synchronizer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub acquisition: Acquisition,
    pub warnings: Vec<SyncWarning>,
}

impl SyncReport {
    pub fn has_warnings(&self) -> bool {
        self.warnings.iter().any(|w| w.severity == Severity::Warning)
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}
