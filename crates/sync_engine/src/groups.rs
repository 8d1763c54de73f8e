//! POINT and ANALOG metadata groups

use contracts::{Acquisition, MetaData, MetaDataValue};

/// POINT: USED, FRAMES, RATE, LABELS
pub(crate) fn point_group(acquisition: &Acquisition) -> MetaData {
    let mut group = MetaData::new("POINT");
    group.append_child(MetaData::leaf(
        "USED",
        "Number of points",
        MetaDataValue::integer(acquisition.points.len() as i32),
    ));
    group.append_child(MetaData::leaf(
        "FRAMES",
        "Number of frames",
        MetaDataValue::integer(acquisition.point_frame_count as i32),
    ));
    group.append_child(MetaData::leaf(
        "RATE",
        "Point frame rate",
        MetaDataValue::real(acquisition.point_frequency as f32),
    ));
    group.append_child(MetaData::leaf(
        "LABELS",
        "",
        MetaDataValue::texts(acquisition.points.iter().map(|p| p.label.clone()).collect()),
    ));
    group
}

/// ANALOG: USED, RATE, LABELS, UNITS, SCALE, OFFSET, ACQUISITION_RATE
///
/// `native_rates` holds the rate of each channel before resampling.
pub(crate) fn analog_group(acquisition: &Acquisition, native_rates: &[f64]) -> MetaData {
    let analogs = &acquisition.analogs;
    let mut group = MetaData::new("ANALOG");
    group.append_child(MetaData::leaf(
        "USED",
        "Number of analog channels",
        MetaDataValue::integer(analogs.len() as i32),
    ));
    group.append_child(MetaData::leaf(
        "RATE",
        "Analog sample rate",
        MetaDataValue::real(acquisition.analog_frequency() as f32),
    ));
    group.append_child(MetaData::leaf(
        "LABELS",
        "",
        MetaDataValue::texts(analogs.iter().map(|a| a.label.clone()).collect()),
    ));
    group.append_child(MetaData::leaf(
        "UNITS",
        "",
        MetaDataValue::texts(analogs.iter().map(|a| a.unit.clone()).collect()),
    ));
    group.append_child(MetaData::leaf(
        "SCALE",
        "",
        MetaDataValue::reals(analogs.iter().map(|a| a.scale as f32).collect()),
    ));
    group.append_child(MetaData::leaf(
        "OFFSET",
        "",
        MetaDataValue::integers(analogs.iter().map(|a| a.offset).collect()),
    ));
    group.append_child(MetaData::leaf(
        "ACQUISITION_RATE",
        "Native rate of each channel",
        MetaDataValue::reals(native_rates.iter().map(|&r| r as f32).collect()),
    ));
    group
}
