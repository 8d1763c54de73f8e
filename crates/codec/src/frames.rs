//! Frame data block
//!
//! Interleaved marker and analog samples, the block a C3D-style writer emits
//! after synchronization. Per point frame: `x y z status` for every marker,
//! then `analog_samples_per_frame` sub-frames of one value per analog channel.

use contracts::{Acquisition, ByteOrder, MarkerSample, OptionRegistry, OptionValue};
use metrics::counter;
use tracing::{debug, instrument, warn};

use crate::codec::ByteOrderCodec;
use crate::error::{Result, StreamError};
use crate::stream::BinaryStream;

pub const OPTION_ENCODING: &str = "Encoding";
pub const OPTION_DATA_STORAGE: &str = "DataStorage";
pub const OPTION_POINT_SCALE: &str = "PointScale";

const DEFAULT_POINT_SCALE: f64 = 0.1;
const OCCLUDED_FLAG: i16 = i16::MIN;

/// Numeric storage of the block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataStorage {
    /// Scaled 16-bit integers
    Integer,
    /// 32-bit reals
    #[default]
    Float,
}

impl DataStorage {
    pub const fn as_str(self) -> &'static str {
        match self {
            DataStorage::Integer => "Integer",
            DataStorage::Float => "Float",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "Integer" => Some(DataStorage::Integer),
            "Float" => Some(DataStorage::Float),
            _ => None,
        }
    }

    /// Bytes per stored value
    pub const fn word_size(self) -> usize {
        match self {
            DataStorage::Integer => 2,
            DataStorage::Float => 4,
        }
    }
}

/// Writer options resolved from an option registry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOptions {
    pub encoding: ByteOrder,
    pub storage: DataStorage,
    /// Length unit of one integer step (also scales residuals)
    pub point_scale: f64,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            encoding: ByteOrder::native(),
            storage: DataStorage::default(),
            point_scale: DEFAULT_POINT_SCALE,
        }
    }
}

impl FrameOptions {
    /// Registry pre-declared with the writer options and their choices
    pub fn registry() -> OptionRegistry {
        let defaults = Self::default();
        let mut registry = OptionRegistry::new();
        registry
            .declare(
                OPTION_ENCODING,
                defaults.encoding.as_str(),
                ByteOrder::ALL
                    .iter()
                    .map(|order| OptionValue::from(order.as_str()))
                    .collect(),
            )
            .declare(
                OPTION_DATA_STORAGE,
                defaults.storage.as_str(),
                vec![
                    DataStorage::Integer.as_str().into(),
                    DataStorage::Float.as_str().into(),
                ],
            )
            .declare(OPTION_POINT_SCALE, defaults.point_scale, Vec::new());
        registry
    }

    /// Resolve options, falling back to defaults for anything missing
    pub fn from_registry(registry: &OptionRegistry) -> Self {
        let defaults = Self::default();
        let encoding = registry
            .get(OPTION_ENCODING)
            .and_then(OptionValue::as_text)
            .and_then(|name| name.parse().ok())
            .unwrap_or(defaults.encoding);
        let storage = registry
            .get(OPTION_DATA_STORAGE)
            .and_then(OptionValue::as_text)
            .and_then(DataStorage::parse)
            .unwrap_or(defaults.storage);
        let point_scale = match registry.get(OPTION_POINT_SCALE).and_then(OptionValue::as_real) {
            Some(scale) if scale.is_finite() && scale > 0.0 => scale,
            Some(scale) => {
                warn!(scale, "PointScale must be positive, using default");
                defaults.point_scale
            }
            None => defaults.point_scale,
        };
        Self {
            encoding,
            storage,
            point_scale,
        }
    }

    pub fn codec(&self) -> ByteOrderCodec {
        ByteOrderCodec::new(self.encoding)
    }
}

/// Per-channel analog conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogScaling {
    pub scale: f64,
    pub offset: i32,
}

impl AnalogScaling {
    fn to_raw(self, value: f64) -> f64 {
        value / self.effective_scale() + self.offset as f64
    }

    fn from_raw(self, raw: f64) -> f64 {
        (raw - self.offset as f64) * self.effective_scale()
    }

    fn effective_scale(self) -> f64 {
        if self.scale != 0.0 {
            self.scale
        } else {
            1.0
        }
    }
}

/// Shape of a block
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub frames: usize,
    pub points: usize,
    pub analog_samples_per_frame: usize,
    pub analogs: Vec<AnalogScaling>,
    pub storage: DataStorage,
    pub point_scale: f64,
}

impl FrameLayout {
    pub fn of(acquisition: &Acquisition, options: &FrameOptions) -> Self {
        Self {
            frames: acquisition.point_frame_count,
            points: acquisition.points.len(),
            analog_samples_per_frame: acquisition.analog_samples_per_frame,
            analogs: acquisition
                .analogs
                .iter()
                .map(|a| AnalogScaling {
                    scale: a.scale,
                    offset: a.offset,
                })
                .collect(),
            storage: options.storage,
            point_scale: options.point_scale,
        }
    }

    /// Stored values per point frame
    pub fn words_per_frame(&self) -> usize {
        self.points * 4 + self.analog_samples_per_frame * self.analogs.len()
    }

    /// Block size in bytes
    pub fn byte_len(&self) -> usize {
        self.frames * self.words_per_frame() * self.storage.word_size()
    }
}

/// Decoded block: marker series then analog series, both in channel order
pub type FrameData = (Vec<Vec<MarkerSample>>, Vec<Vec<f64>>);

fn status_word(sample: &MarkerSample, point_scale: f64) -> i16 {
    if sample.occluded {
        return OCCLUDED_FLAG;
    }
    (sample.residual / point_scale).round().clamp(1.0, 127.0) as i16
}

fn fits_i16(value: f64) -> bool {
    let rounded = value.round();
    rounded >= i16::MIN as f64 && rounded <= i16::MAX as f64
}

/// Every stored value must fit an i16 before the first byte goes out
fn check_integer_range(acquisition: &Acquisition, layout: &FrameLayout) -> Result<()> {
    let out_of_range = |channel: &str, frame: usize, value: f64| StreamError::Range {
        channel: channel.to_string(),
        frame,
        value,
    };
    for point in &acquisition.points {
        for (frame, sample) in point.samples.iter().enumerate().take(layout.frames) {
            if sample.occluded {
                continue;
            }
            if let Some(&axis) = sample
                .position
                .iter()
                .find(|&&axis| !fits_i16(axis / layout.point_scale))
            {
                return Err(out_of_range(&point.label, frame, axis));
            }
        }
    }
    let apf = layout.analog_samples_per_frame;
    for (analog, scaling) in acquisition.analogs.iter().zip(&layout.analogs) {
        for (index, &value) in analog.samples.iter().enumerate().take(layout.frames * apf) {
            if !fits_i16(scaling.to_raw(value)) {
                return Err(out_of_range(&analog.label, index / apf.max(1), value));
            }
        }
    }
    Ok(())
}

fn write_value<S: BinaryStream + ?Sized>(
    codec: &ByteOrderCodec,
    stream: &mut S,
    storage: DataStorage,
    value: f64,
) -> Result<()> {
    match storage {
        DataStorage::Float => codec.write_f32(value as f32, stream),
        DataStorage::Integer => codec.write_i16(value.round() as i16, stream),
    }
}

fn read_value<S: BinaryStream + ?Sized>(
    codec: &ByteOrderCodec,
    stream: &mut S,
    storage: DataStorage,
) -> Result<f64> {
    Ok(match storage {
        DataStorage::Float => codec.read_f32(stream)? as f64,
        DataStorage::Integer => codec.read_i16(stream)? as f64,
    })
}

/// Encode every frame of `acquisition`. Returns the bytes written.
#[instrument(
    name = "frames_write",
    skip(acquisition, codec, stream),
    fields(frames = acquisition.point_frame_count, encoding = %codec.order())
)]
pub fn write_frames<S: BinaryStream + ?Sized>(
    acquisition: &Acquisition,
    codec: &ByteOrderCodec,
    stream: &mut S,
    options: &FrameOptions,
) -> Result<u64> {
    acquisition.check_invariant()?;
    let layout = FrameLayout::of(acquisition, options);
    if layout.storage == DataStorage::Integer {
        check_integer_range(acquisition, &layout)?;
    }
    let start = stream.tell();
    // integer positions are stored in point-scale units
    let position_unit = match layout.storage {
        DataStorage::Integer => layout.point_scale,
        DataStorage::Float => 1.0,
    };

    for frame in 0..layout.frames {
        for point in &acquisition.points {
            let sample = &point.samples[frame];
            for axis in sample.position {
                write_value(codec, stream, layout.storage, axis / position_unit)?;
            }
            let status = status_word(sample, layout.point_scale);
            write_value(codec, stream, layout.storage, status as f64)?;
        }
        for sub in 0..layout.analog_samples_per_frame {
            let index = frame * layout.analog_samples_per_frame + sub;
            for (analog, scaling) in acquisition.analogs.iter().zip(&layout.analogs) {
                let raw = scaling.to_raw(analog.samples[index]);
                write_value(codec, stream, layout.storage, raw)?;
            }
        }
    }

    let written = stream.tell() - start;
    counter!("codec_frames_written_total", "encoding" => codec.order().as_str())
        .increment(layout.frames as u64);
    counter!("codec_bytes_written_total").increment(written);
    debug!(bytes = written, "frame block written");
    Ok(written)
}

/// Decode a block described by `layout`
#[instrument(
    name = "frames_read",
    skip(codec, stream, layout),
    fields(frames = layout.frames, encoding = %codec.order())
)]
pub fn read_frames<S: BinaryStream + ?Sized>(
    codec: &ByteOrderCodec,
    stream: &mut S,
    layout: &FrameLayout,
) -> Result<FrameData> {
    let apf = layout.analog_samples_per_frame;
    let mut markers = vec![Vec::with_capacity(layout.frames); layout.points];
    let mut analogs = vec![Vec::with_capacity(layout.frames * apf); layout.analogs.len()];
    let position_unit = match layout.storage {
        DataStorage::Integer => layout.point_scale,
        DataStorage::Float => 1.0,
    };

    for _ in 0..layout.frames {
        for series in markers.iter_mut() {
            let mut position = [0.0; 3];
            for axis in position.iter_mut() {
                *axis = read_value(codec, stream, layout.storage)? * position_unit;
            }
            let status = read_value(codec, stream, layout.storage)? as i16;
            let sample = if status < 0 {
                MarkerSample {
                    position,
                    residual: 0.0,
                    occluded: true,
                }
            } else {
                MarkerSample {
                    position,
                    residual: (status & 0xFF) as f64 * layout.point_scale,
                    occluded: false,
                }
            };
            series.push(sample);
        }
        for _ in 0..apf {
            for (series, scaling) in analogs.iter_mut().zip(&layout.analogs) {
                let raw = read_value(codec, stream, layout.storage)?;
                series.push(scaling.from_raw(raw));
            }
        }
    }

    Ok((markers, analogs))
}
