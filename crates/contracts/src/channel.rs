//! Channels - marker and analog time series
//!
//! A channel is a fixed-length series of samples plus its native rate and
//! start time. Length never changes in place: padding or resampling builds a
//! new channel from the consumed one.

use serde::{Deserialize, Serialize};

/// Common view over marker and analog channels
pub trait Channel {
    /// Display name, unique within its collection
    fn label(&self) -> &str;

    /// Samples per second (0 = inherit from the group)
    fn rate(&self) -> f64;

    /// Offset of the first sample (seconds)
    fn start_time(&self) -> f64;

    /// Number of samples
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One marker sample: position plus validity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerSample {
    /// Position (x, y, z)
    pub position: [f64; 3],

    /// Reconstruction residual, 0 when unknown
    #[serde(default)]
    pub residual: f64,

    /// Marker was not seen at this frame
    #[serde(default)]
    pub occluded: bool,
}

impl MarkerSample {
    /// Valid sample at the given position
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: [x, y, z],
            residual: 0.0,
            occluded: false,
        }
    }

    /// Invalid sample used for invented frames
    pub fn occluded() -> Self {
        Self {
            position: [0.0; 3],
            residual: 0.0,
            occluded: true,
        }
    }
}

/// Marker (3D position) channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerChannel {
    pub label: String,

    #[serde(default)]
    pub description: String,

    /// Samples per second (0 = inherit)
    #[serde(default)]
    pub rate: f64,

    /// Offset of the first sample (seconds)
    #[serde(default)]
    pub start_time: f64,

    #[serde(default)]
    pub samples: Vec<MarkerSample>,
}

impl MarkerChannel {
    /// Create an empty channel
    pub fn new(label: impl Into<String>, rate: f64) -> Self {
        Self {
            label: label.into(),
            rate,
            ..Default::default()
        }
    }

    /// Attach samples
    pub fn with_samples(mut self, samples: Vec<MarkerSample>) -> Self {
        self.samples = samples;
        self
    }

    /// Consume the channel, returning one of exactly `frames` samples.
    ///
    /// Missing tail frames are occluded; extra frames are dropped.
    pub fn into_resized(mut self, frames: usize) -> Self {
        self.samples.resize(frames, MarkerSample::occluded());
        self
    }
}

impl Channel for MarkerChannel {
    fn label(&self) -> &str {
        &self.label
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Analog (scalar) channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalogChannel {
    pub label: String,

    #[serde(default)]
    pub description: String,

    /// Physical unit (e.g. "V", "N", "Nmm")
    #[serde(default)]
    pub unit: String,

    /// Storage scale: value = (raw - offset) * scale
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Storage offset
    #[serde(default)]
    pub offset: i32,

    /// Samples per second (0 = inherit)
    #[serde(default)]
    pub rate: f64,

    /// Offset of the first sample (seconds)
    #[serde(default)]
    pub start_time: f64,

    /// Acquisition hardware channel id, used by force platform descriptors
    #[serde(default)]
    pub hardware_id: Option<u32>,

    #[serde(default)]
    pub samples: Vec<f64>,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for AnalogChannel {
    fn default() -> Self {
        Self {
            label: String::new(),
            description: String::new(),
            unit: String::new(),
            scale: default_scale(),
            offset: 0,
            rate: 0.0,
            start_time: 0.0,
            hardware_id: None,
            samples: Vec::new(),
        }
    }
}

impl AnalogChannel {
    /// Create an empty channel
    pub fn new(label: impl Into<String>, rate: f64) -> Self {
        Self {
            label: label.into(),
            rate,
            ..Default::default()
        }
    }

    /// Attach samples
    pub fn with_samples(mut self, samples: Vec<f64>) -> Self {
        self.samples = samples;
        self
    }

    /// Attach a hardware channel id
    pub fn with_hardware_id(mut self, id: u32) -> Self {
        self.hardware_id = Some(id);
        self
    }

    /// Replace the samples, keeping every other property
    pub fn with_resampled(self, samples: Vec<f64>, rate: f64) -> Self {
        Self {
            samples,
            rate,
            ..self
        }
    }
}

impl Channel for AnalogChannel {
    fn label(&self) -> &str {
        &self.label
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
