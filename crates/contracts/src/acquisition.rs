//! Acquisition - synchronized data set
//!
//! Output of the synchronizer, input of writers and analysis.

use serde::{Deserialize, Serialize};

use crate::{AnalogChannel, Channel, ContractError, MarkerChannel, MetaData};

/// Label of the metadata root node
pub const METADATA_ROOT: &str = "ROOT";

/// Frame-aligned acquisition
///
/// Every marker channel holds exactly `point_frame_count` samples and every
/// analog channel exactly `point_frame_count * analog_samples_per_frame`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acquisition {
    /// Marker frame rate (Hz)
    pub point_frequency: f64,

    /// Index of the first frame (1-based, C3D convention)
    pub first_frame: i32,

    /// Number of frames shared by every marker channel
    pub point_frame_count: usize,

    /// Analog samples per marker frame (>= 1)
    pub analog_samples_per_frame: usize,

    /// Marker channels in discovery order
    pub points: Vec<MarkerChannel>,

    /// Analog channels in discovery order
    pub analogs: Vec<AnalogChannel>,

    /// Provenance tree
    pub metadata: MetaData,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self {
            point_frequency: 0.0,
            first_frame: 1,
            point_frame_count: 0,
            analog_samples_per_frame: 1,
            points: Vec::new(),
            analogs: Vec::new(),
            metadata: MetaData::new(METADATA_ROOT),
        }
    }
}

impl Acquisition {
    /// Analog sample rate (Hz)
    pub fn analog_frequency(&self) -> f64 {
        self.point_frequency * self.analog_samples_per_frame as f64
    }

    /// Samples every analog channel must hold
    pub fn analog_sample_count(&self) -> usize {
        self.point_frame_count * self.analog_samples_per_frame
    }

    /// Index of the last frame
    pub fn last_frame(&self) -> i32 {
        self.first_frame + self.point_frame_count as i32 - 1
    }

    /// Duration covered by the marker frames (seconds)
    pub fn duration(&self) -> f64 {
        if self.point_frequency > 0.0 {
            self.point_frame_count as f64 / self.point_frequency
        } else {
            0.0
        }
    }

    pub fn point(&self, label: &str) -> Option<&MarkerChannel> {
        self.points.iter().find(|p| p.label == label)
    }

    pub fn analog(&self, label: &str) -> Option<&AnalogChannel> {
        self.analogs.iter().find(|a| a.label == label)
    }

    /// Verify the sample-count invariant on every channel
    pub fn check_invariant(&self) -> Result<(), ContractError> {
        if self.analog_samples_per_frame == 0 {
            return Err(ContractError::config_validation(
                "analog_samples_per_frame",
                "must be a positive integer",
            ));
        }
        for point in &self.points {
            if point.len() != self.point_frame_count {
                return Err(ContractError::invariant(
                    &point.label,
                    self.point_frame_count,
                    point.len(),
                ));
            }
        }
        let analog_count = self.analog_sample_count();
        for analog in &self.analogs {
            if analog.len() != analog_count {
                return Err(ContractError::invariant(
                    &analog.label,
                    analog_count,
                    analog.len(),
                ));
            }
        }
        Ok(())
    }
}
