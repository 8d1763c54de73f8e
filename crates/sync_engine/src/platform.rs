//! Force platform metadata
//!
//! Builds the `FORCE_PLATFORM` group from platform descriptors and wires
//! each platform channel to its analog channel by hardware id.

use std::collections::BTreeSet;

use contracts::{
    AnalogChannel, MetaData, MetaDataValue, MetaDataValues, PlatformDescriptor,
    PlatformManufacturer, SynchronizerConfig, WarningKind,
};
use nalgebra::Vector3;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::warnings::Warnings;

pub const FORCE_PLATFORM: &str = "FORCE_PLATFORM";

const AMTI_LABELS: [&str; 6] = ["FX", "FY", "FZ", "MX", "MY", "MZ"];
const KISTLER_LABELS: [&str; 8] = ["FX12", "FX34", "FY14", "FY23", "FZ1", "FZ2", "FZ3", "FZ4"];
const CALIBRATED_TYPE: i32 = 4;

/// A platform that passed classification
struct UsedPlatform<'a> {
    descriptor: &'a PlatformDescriptor,
    manufacturer: PlatformManufacturer,
    type_code: i32,
    /// 1-based analog index per channel slot, 0 when unresolved
    slots: Vec<i32>,
}

impl UsedPlatform<'_> {
    fn origin(&self) -> Vector3<f64> {
        match self.manufacturer {
            PlatformManufacturer::Kistler => {
                let sep = &self.descriptor.sensor_separation;
                Vector3::new(sep.y, sep.x, -sep.z)
            }
            _ => -self.descriptor.centre_offset,
        }
    }

    fn label(&self, slot: usize, suffix: &str) -> Option<(String, &'static str)> {
        match self.manufacturer {
            PlatformManufacturer::Amti => AMTI_LABELS
                .get(slot)
                .map(|l| (format!("{l}{suffix}"), if slot < 3 { "N" } else { "Nmm" })),
            PlatformManufacturer::Kistler => KISTLER_LABELS
                .get(slot)
                .map(|l| (format!("{l}{suffix}"), "N")),
            PlatformManufacturer::Unknown => None,
        }
    }
}

/// Classify platforms, resolve channels, flip force signs and assemble the
/// metadata group. Returns `None` when no descriptors were given.
#[instrument(name = "sync_platforms", skip_all, fields(platforms = platforms.len()))]
pub(crate) fn derive(
    platforms: &[PlatformDescriptor],
    analogs: &mut [AnalogChannel],
    config: &SynchronizerConfig,
    warnings: &mut Warnings,
) -> Result<Option<MetaData>> {
    if platforms.is_empty() {
        return Ok(None);
    }

    let mut used = Vec::new();
    for (index, descriptor) in platforms.iter().enumerate() {
        let manufacturer = descriptor.manufacturer();
        let (Some(width), Some(type_code)) = (
            manufacturer.channel_width(),
            manufacturer.type_code(descriptor.calibration.is_some()),
        ) else {
            warnings.warn(
                WarningKind::UnknownPlatformType,
                format!(
                    "platform #{} has unknown manufacturer '{}', skipped",
                    index + 1,
                    descriptor.manufacturer
                ),
            );
            continue;
        };
        if descriptor.channels.len() != width {
            warnings.warn(
                WarningKind::PlatformChannelCount,
                format!(
                    "platform #{} declares {} channels, {} expected, skipped",
                    index + 1,
                    descriptor.channels.len(),
                    width
                ),
            );
            continue;
        }

        let slots = descriptor
            .channels
            .iter()
            .map(|&hardware_id| {
                match analogs
                    .iter()
                    .position(|a| a.hardware_id == Some(hardware_id))
                {
                    Some(i) => (i + 1) as i32,
                    None => {
                        warnings.info(
                            WarningKind::PlatformChannelMissing,
                            format!(
                                "platform #{} hardware id {} matches no analog channel",
                                index + 1,
                                hardware_id
                            ),
                        );
                        0
                    }
                }
            })
            .collect();

        used.push(UsedPlatform {
            descriptor,
            manufacturer,
            type_code,
            slots,
        });
    }

    if config.flip_force_sign {
        let wired: BTreeSet<usize> = used
            .iter()
            .flat_map(|p| p.slots.iter())
            .filter(|&&slot| slot > 0)
            .map(|&slot| slot as usize - 1)
            .collect();
        for &i in &wired {
            analogs[i].samples.iter_mut().for_each(|v| *v = -*v);
        }
        debug!(channels = wired.len(), "force channel signs flipped");
    }

    if config.relabel_force_channels {
        relabel(&used, analogs);
    }

    metrics::gauge!("sync_platforms_used").set(used.len() as f64);
    build_group(&used).map(Some)
}

fn relabel(used: &[UsedPlatform<'_>], analogs: &mut [AnalogChannel]) {
    let numbered = used.len() > 1;
    for (n, platform) in used.iter().enumerate() {
        let suffix = match (numbered, platform.manufacturer) {
            (false, _) => String::new(),
            (true, PlatformManufacturer::Kistler) => format!("_{}", n + 1),
            (true, _) => (n + 1).to_string(),
        };
        for (slot, &index) in platform.slots.iter().enumerate() {
            if index <= 0 {
                continue;
            }
            if let Some((label, unit)) = platform.label(slot, &suffix) {
                let analog = &mut analogs[index as usize - 1];
                analog.label = label;
                analog.unit = unit.to_string();
            }
        }
    }
}

fn build_group(used: &[UsedPlatform<'_>]) -> Result<MetaData> {
    let count = used.len();
    let width = used.iter().map(|p| p.slots.len()).max().unwrap_or(0);

    let mut corners = vec![0.0f32; 12 * count];
    let mut origins = vec![0.0f32; 3 * count];
    let mut channels = vec![0i32; width * count];
    for (i, platform) in used.iter().enumerate() {
        for (c, corner) in platform.descriptor.corners.iter().enumerate() {
            let base = 12 * i + 3 * ((c + 2) % 4);
            for axis in 0..3 {
                corners[base + axis] = corner[axis] as f32;
            }
        }
        let origin = platform.origin();
        for axis in 0..3 {
            origins[3 * i + axis] = origin[axis] as f32;
        }
        channels[width * i..width * i + platform.slots.len()].copy_from_slice(&platform.slots);
    }

    let mut group = MetaData::new(FORCE_PLATFORM);
    group.append_child(MetaData::leaf(
        "USED",
        "Number of force platforms",
        MetaDataValue::integer(count as i32),
    ));
    group.append_child(MetaData::leaf(
        "TYPE",
        "Force platform types",
        MetaDataValue::integers(used.iter().map(|p| p.type_code).collect()),
    ));
    group.append_child(MetaData::leaf(
        "ZERO",
        "",
        MetaDataValue::integers(vec![0, 0]),
    ));
    group.append_child(MetaData::leaf(
        "CORNERS",
        "Outline corners",
        MetaDataValue::new(vec![3, 4, count], MetaDataValues::Real(corners))?,
    ));
    group.append_child(MetaData::leaf(
        "ORIGIN",
        "Sensor origin offsets",
        MetaDataValue::new(vec![3, count], MetaDataValues::Real(origins))?,
    ));
    group.append_child(MetaData::leaf(
        "CHANNEL",
        "Analog channel of each platform output",
        MetaDataValue::new(vec![width, count], MetaDataValues::Integer(channels))?,
    ));

    if used.iter().any(|p| p.type_code == CALIBRATED_TYPE) {
        // one width x width block per platform, the 6x6 matrix in its corner
        let block = width * width;
        let mut calibration = vec![0.0f32; block * count];
        for (i, platform) in used.iter().enumerate() {
            let Some(matrix) = platform.descriptor.calibration.as_ref() else {
                continue;
            };
            for row in 0..6 {
                for col in 0..6 {
                    calibration[block * i + width * row + col] = matrix[(row, col)] as f32;
                }
            }
        }
        group.append_child(MetaData::leaf(
            "CAL_MATRIX",
            "Calibration matrices",
            MetaDataValue::new(vec![width, width, count], MetaDataValues::Real(calibration))?,
        ));
        group.append_child(MetaData::leaf(
            "MATRIX_STORE",
            "",
            MetaDataValue::text("BYCOLUMN"),
        ));
    }

    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Severity;
    use nalgebra::Matrix6;

    fn analogs(count: usize) -> Vec<AnalogChannel> {
        (0..count)
            .map(|i| {
                AnalogChannel::new(format!("Force{}", i + 1), 1000.0)
                    .with_samples(vec![1.0, -2.0])
                    .with_hardware_id(100 + i as u32)
            })
            .collect()
    }

    fn amti(channels: Vec<u32>) -> PlatformDescriptor {
        PlatformDescriptor {
            manufacturer: "AMTI".to_string(),
            corners: [
                Vector3::new(1.0, 2.0, 0.0),
                Vector3::new(3.0, 4.0, 0.0),
                Vector3::new(5.0, 6.0, 0.0),
                Vector3::new(7.0, 8.0, 0.0),
            ],
            centre_offset: Vector3::new(0.5, -0.5, 40.0),
            sensor_separation: Vector3::zeros(),
            channels,
            calibration: None,
        }
    }

    fn integers<'a>(group: &'a MetaData, label: &str) -> &'a [i32] {
        group
            .child(label)
            .and_then(|m| m.value.as_ref())
            .and_then(MetaDataValue::as_integers)
            .unwrap()
    }

    fn reals<'a>(group: &'a MetaData, label: &str) -> &'a [f32] {
        group
            .child(label)
            .and_then(|m| m.value.as_ref())
            .and_then(MetaDataValue::as_reals)
            .unwrap()
    }

    #[test]
    fn test_channel_remap_and_sign_flip() {
        let mut channels = analogs(10);
        // slot 0 wired to the fifth analog channel (index 4)
        let plate = amti(vec![104, 105, 106, 107, 108, 109]);
        let mut warnings = Warnings::default();
        let group = derive(
            &[plate],
            &mut channels,
            &SynchronizerConfig::default(),
            &mut warnings,
        )
        .unwrap()
        .unwrap();

        assert_eq!(integers(&group, "CHANNEL")[0], 5);
        assert_eq!(integers(&group, "CHANNEL"), &[5, 6, 7, 8, 9, 10]);
        assert_eq!(channels[4].samples, vec![-1.0, 2.0]);
        assert_eq!(channels[3].samples, vec![1.0, -2.0]);
        assert_eq!(integers(&group, "USED"), &[1]);
        assert_eq!(integers(&group, "TYPE"), &[2]);
        assert!(warnings.into_vec().is_empty());
    }

    #[test]
    fn test_corner_rotation_and_origin() {
        let mut channels = analogs(6);
        let plate = amti(vec![100, 101, 102, 103, 104, 105]);
        let mut warnings = Warnings::default();
        let group = derive(&[plate], &mut channels, &SynchronizerConfig::default(), &mut warnings)
            .unwrap()
            .unwrap();

        let corners = reals(&group, "CORNERS");
        // corner 0 stored in slot 2, corner 2 in slot 0
        assert_eq!(&corners[6..9], &[1.0, 2.0, 0.0]);
        assert_eq!(&corners[0..3], &[5.0, 6.0, 0.0]);
        assert_eq!(reals(&group, "ORIGIN"), &[-0.5, 0.5, -40.0]);
        assert_eq!(group.child("CORNERS").unwrap().value.as_ref().unwrap().dimensions(), &[3, 4, 1]);
    }

    #[test]
    fn test_kistler_origin_and_width() {
        let mut channels = analogs(8);
        let plate = PlatformDescriptor {
            manufacturer: "Kistler".to_string(),
            sensor_separation: Vector3::new(120.0, 200.0, -45.0),
            channels: (100..108).collect(),
            ..amti(Vec::new())
        };
        let mut warnings = Warnings::default();
        let group = derive(&[plate], &mut channels, &SynchronizerConfig::default(), &mut warnings)
            .unwrap()
            .unwrap();

        assert_eq!(reals(&group, "ORIGIN"), &[200.0, 120.0, 45.0]);
        assert_eq!(integers(&group, "TYPE"), &[3]);
        assert_eq!(integers(&group, "CHANNEL").len(), 8);
    }

    #[test]
    fn test_unknown_and_miswired_platforms_skipped() {
        let mut channels = analogs(6);
        let unknown = PlatformDescriptor {
            manufacturer: "Bertec".to_string(),
            ..amti(vec![100, 101, 102, 103, 104, 105])
        };
        let short = amti(vec![100, 101]);
        let mut warnings = Warnings::default();
        let group = derive(
            &[unknown, short],
            &mut channels,
            &SynchronizerConfig::default(),
            &mut warnings,
        )
        .unwrap()
        .unwrap();

        assert_eq!(integers(&group, "USED"), &[0]);
        assert!(integers(&group, "TYPE").is_empty());
        let kinds: Vec<_> = warnings.into_vec().into_iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::UnknownPlatformType, WarningKind::PlatformChannelCount]
        );
        // untouched
        assert_eq!(channels[0].samples, vec![1.0, -2.0]);
    }

    #[test]
    fn test_missing_hardware_id_leaves_slot_unset() {
        let mut channels = analogs(5);
        let plate = amti(vec![100, 101, 102, 103, 104, 999]);
        let mut warnings = Warnings::default();
        let group = derive(&[plate], &mut channels, &SynchronizerConfig::default(), &mut warnings)
            .unwrap()
            .unwrap();

        assert_eq!(integers(&group, "CHANNEL"), &[1, 2, 3, 4, 5, 0]);
        let warnings = warnings.into_vec();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].severity, Severity::Info);
        assert_eq!(warnings[0].kind, WarningKind::PlatformChannelMissing);
    }

    #[test]
    fn test_shared_channel_flipped_once() {
        let mut channels = analogs(6);
        let ids = vec![100, 101, 102, 103, 104, 105];
        let mut warnings = Warnings::default();
        derive(
            &[amti(ids.clone()), amti(ids)],
            &mut channels,
            &SynchronizerConfig::default(),
            &mut warnings,
        )
        .unwrap();
        assert_eq!(channels[0].samples, vec![-1.0, 2.0]);
    }

    #[test]
    fn test_flip_disabled() {
        let mut channels = analogs(6);
        let config = SynchronizerConfig {
            flip_force_sign: false,
            ..Default::default()
        };
        let mut warnings = Warnings::default();
        derive(&[amti((100..106).collect())], &mut channels, &config, &mut warnings).unwrap();
        assert_eq!(channels[0].samples, vec![1.0, -2.0]);
    }

    #[test]
    fn test_calibration_matrix_layout() {
        let mut channels = analogs(6);
        let mut matrix = Matrix6::zeros();
        matrix[(0, 1)] = 7.0;
        let plate = PlatformDescriptor {
            calibration: Some(matrix),
            ..amti((100..106).collect())
        };
        let mut warnings = Warnings::default();
        let group = derive(&[plate], &mut channels, &SynchronizerConfig::default(), &mut warnings)
            .unwrap()
            .unwrap();

        assert_eq!(integers(&group, "TYPE"), &[4]);
        let cal = reals(&group, "CAL_MATRIX");
        assert_eq!(cal.len(), 36);
        assert_eq!(cal[1], 7.0);
        assert_eq!(cal[6], 0.0);
        assert!(group.child("MATRIX_STORE").is_some());
    }

    #[test]
    fn test_calibration_matrix_sized_by_widest_platform() {
        let mut channels = analogs(14);
        let mut matrix = Matrix6::zeros();
        matrix[(0, 1)] = 7.0;
        matrix[(5, 5)] = 3.0;
        let calibrated = PlatformDescriptor {
            calibration: Some(matrix),
            ..amti((100..106).collect())
        };
        let kistler = PlatformDescriptor {
            manufacturer: "Kistler".to_string(),
            channels: (106..114).collect(),
            ..amti(Vec::new())
        };
        let mut warnings = Warnings::default();
        let group = derive(
            &[calibrated, kistler],
            &mut channels,
            &SynchronizerConfig::default(),
            &mut warnings,
        )
        .unwrap()
        .unwrap();

        let dims = group.child("CAL_MATRIX").unwrap().value.as_ref().unwrap().dimensions();
        assert_eq!(dims, &[8, 8, 2]);
        let cal = reals(&group, "CAL_MATRIX");
        assert_eq!(cal.len(), 128);
        assert_eq!(cal[1], 7.0);
        assert_eq!(cal[8 * 5 + 5], 3.0);
        // padding and the uncalibrated plate stay zero
        assert_eq!(cal[6], 0.0);
        assert!(cal[64..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_relabel_force_channels() {
        let mut channels = analogs(14);
        let kistler = PlatformDescriptor {
            manufacturer: "Kistler".to_string(),
            channels: (106..114).collect(),
            ..amti(Vec::new())
        };
        let config = SynchronizerConfig {
            relabel_force_channels: true,
            ..Default::default()
        };
        let mut warnings = Warnings::default();
        derive(
            &[amti((100..106).collect()), kistler],
            &mut channels,
            &config,
            &mut warnings,
        )
        .unwrap();

        assert_eq!(channels[0].label, "FX1");
        assert_eq!(channels[5].label, "MZ1");
        assert_eq!(channels[5].unit, "Nmm");
        assert_eq!(channels[6].label, "FX12_2");
        assert_eq!(channels[13].label, "FZ4_2");
        assert_eq!(channels[13].unit, "N");
    }

    #[test]
    fn test_no_descriptors() {
        let mut channels = analogs(2);
        let mut warnings = Warnings::default();
        let group = derive(&[], &mut channels, &SynchronizerConfig::default(), &mut warnings).unwrap();
        assert!(group.is_none());
    }
}
