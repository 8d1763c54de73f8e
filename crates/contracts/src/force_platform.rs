//! Force platform descriptors
//!
//! Geometry and channel wiring of a force plate, as a format reader or the
//! acquisition system reports it. The synchronizer turns these into the
//! `FORCE_PLATFORM` metadata group.

use nalgebra::{Matrix6, Vector3};
use serde::{Deserialize, Serialize};

/// Manufacturer family, decides the channel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformManufacturer {
    /// Six channels: Fx Fy Fz Mx My Mz
    Amti,
    /// Eight channels: piezo sensor pairs
    Kistler,
    Unknown,
}

impl PlatformManufacturer {
    /// Classify a manufacturer tag (case-insensitive)
    pub fn classify(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "amti" => PlatformManufacturer::Amti,
            "kistler" => PlatformManufacturer::Kistler,
            _ => PlatformManufacturer::Unknown,
        }
    }

    /// Channels per platform
    pub const fn channel_width(self) -> Option<usize> {
        match self {
            PlatformManufacturer::Amti => Some(6),
            PlatformManufacturer::Kistler => Some(8),
            PlatformManufacturer::Unknown => None,
        }
    }

    /// Legacy platform type code (AMTI=2, or 4 with calibration; Kistler=3)
    pub const fn type_code(self, calibrated: bool) -> Option<i32> {
        match self {
            PlatformManufacturer::Amti if calibrated => Some(4),
            PlatformManufacturer::Amti => Some(2),
            PlatformManufacturer::Kistler => Some(3),
            PlatformManufacturer::Unknown => None,
        }
    }
}

/// Force platform geometry descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// Manufacturer tag ("AMTI", "Kistler", ...)
    pub manufacturer: String,

    /// Outline corners in the global frame
    pub corners: [Vector3<f64>; 4],

    /// AMTI: offset of the plate centre from the sensor origin
    #[serde(default = "zero_vector")]
    pub centre_offset: Vector3<f64>,

    /// Kistler: sensor separation (a, b, az0)
    #[serde(default = "zero_vector")]
    pub sensor_separation: Vector3<f64>,

    /// Hardware ids of the platform channels, in layout order
    #[serde(default)]
    pub channels: Vec<u32>,

    /// Optional 6x6 calibration matrix
    #[serde(default)]
    pub calibration: Option<Matrix6<f64>>,
}

fn zero_vector() -> Vector3<f64> {
    Vector3::zeros()
}

impl PlatformDescriptor {
    pub fn manufacturer(&self) -> PlatformManufacturer {
        PlatformManufacturer::classify(&self.manufacturer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(PlatformManufacturer::classify("AMTI"), PlatformManufacturer::Amti);
        assert_eq!(
            PlatformManufacturer::classify(" kistler "),
            PlatformManufacturer::Kistler
        );
        assert_eq!(
            PlatformManufacturer::classify("Bertec"),
            PlatformManufacturer::Unknown
        );
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(PlatformManufacturer::Amti.type_code(false), Some(2));
        assert_eq!(PlatformManufacturer::Amti.type_code(true), Some(4));
        assert_eq!(PlatformManufacturer::Kistler.type_code(true), Some(3));
        assert_eq!(PlatformManufacturer::Unknown.channel_width(), None);
    }

    #[test]
    fn test_descriptor_from_json() {
        let json = r#"{
            "manufacturer": "AMTI",
            "corners": [[0,0,0],[600,0,0],[600,400,0],[0,400,0]],
            "channels": [1,2,3,4,5,6]
        }"#;
        let plate: PlatformDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(plate.manufacturer(), PlatformManufacturer::Amti);
        assert_eq!(plate.corners[1].x, 600.0);
        assert_eq!(plate.centre_offset, Vector3::zeros());
        assert!(plate.calibration.is_none());
    }
}
