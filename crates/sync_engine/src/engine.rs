//! Acquisition synchronizer

use std::time::Instant;

use contracts::{
    Acquisition, AnalogChannel, Channel, ChannelGroup, MarkerChannel, MetaData, SyncInput,
    SyncReport, SynchronizerConfig, WarningKind, METADATA_ROOT,
};
use tracing::{debug, info, instrument};

use crate::error::{Result, SyncError};
use crate::groups::{analog_group, point_group};
use crate::markers::{self, MarkerClock};
use crate::platform;
use crate::rate::{derive_common_rate, subsample_factor};
use crate::resample::{fit_length, upsample};
use crate::warnings::Warnings;

/// Turns heterogeneous channel groups into one frame-aligned `Acquisition`
///
/// Stateless between runs: every `run` owns its input and its warnings.
#[derive(Debug, Clone, Default)]
pub struct Synchronizer {
    config: SynchronizerConfig,
}

/// Analog timeline shared by every output channel
#[derive(Debug, Clone, Copy)]
struct Timeline {
    point_frequency: f64,
    analog_frequency: f64,
    samples_per_frame: usize,
    frames: usize,
    first_frame: i32,
    start_time: f64,
}

impl Synchronizer {
    pub fn new(config: SynchronizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynchronizerConfig {
        &self.config
    }

    /// Synchronize `input`. Fatal errors return no partial output.
    #[instrument(
        name = "sync_run",
        skip_all,
        fields(
            groups = input.groups.len(),
            markers = input.marker_count(),
            analogs = input.analog_count()
        )
    )]
    pub fn run(&self, input: SyncInput) -> Result<SyncReport> {
        let started = Instant::now();
        let mut warnings = Warnings::default();
        let SyncInput { groups, platforms } = input;

        let (markers, analogs) = resolve_timing(groups)?;
        let native_rates: Vec<f64> = analogs.iter().map(|a| a.rate).collect();

        let (clock, points) = match markers::reconcile(markers, &self.config, &mut warnings)? {
            Some((clock, points)) => (Some(clock), points),
            None => (None, Vec::new()),
        };

        let analog_frequency = self.analog_frequency(clock.as_ref(), &native_rates)?;
        let mut analogs = self.upsample_analogs(analogs, analog_frequency, &mut warnings);
        let timeline = timeline(clock.as_ref(), analog_frequency, &analogs);
        self.fit_analogs(&mut analogs, &timeline, &mut warnings);

        let platform_group =
            platform::derive(&platforms, &mut analogs, &self.config, &mut warnings)?;

        let mut acquisition = Acquisition {
            point_frequency: timeline.point_frequency,
            first_frame: timeline.first_frame,
            point_frame_count: timeline.frames,
            analog_samples_per_frame: timeline.samples_per_frame,
            points,
            analogs,
            metadata: MetaData::new(METADATA_ROOT),
        };
        let point = point_group(&acquisition);
        let analog = analog_group(&acquisition, &native_rates);
        acquisition.metadata.append_child(point);
        acquisition.metadata.append_child(analog);
        if let Some(group) = platform_group {
            acquisition.metadata.append_child(group);
        }

        acquisition.check_invariant()?;

        let warnings = warnings.into_vec();
        metrics::counter!("sync_runs_total").increment(1);
        metrics::histogram!("sync_run_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            point_frequency = acquisition.point_frequency,
            analog_frequency = acquisition.analog_frequency(),
            frames = acquisition.point_frame_count,
            warnings = warnings.len(),
            "synchronization complete"
        );
        Ok(SyncReport {
            acquisition,
            warnings,
        })
    }

    /// Common analog frequency; the marker rate when there are no analogs
    fn analog_frequency(&self, clock: Option<&MarkerClock>, native_rates: &[f64]) -> Result<f64> {
        if native_rates.is_empty() {
            return Ok(clock.map(|c| c.rate).unwrap_or(0.0));
        }
        let mut rates = native_rates.to_vec();
        if let Some(clock) = clock {
            rates.push(clock.rate);
        }
        derive_common_rate(&rates, &self.config)
    }

    #[instrument(name = "sync_upsample", skip_all, fields(common = analog_frequency))]
    fn upsample_analogs(
        &self,
        analogs: Vec<AnalogChannel>,
        analog_frequency: f64,
        warnings: &mut Warnings,
    ) -> Vec<AnalogChannel> {
        analogs
            .into_iter()
            .map(|mut analog| {
                let (k, exact) =
                    subsample_factor(analog_frequency, analog.rate, self.config.rate_tolerance);
                if !exact {
                    warnings.warn(
                        WarningKind::NonExactSubsample,
                        format!(
                            "analog '{}' at {} Hz is not a divisor of {} Hz, interpolated by {}",
                            analog.label, analog.rate, analog_frequency, k
                        ),
                    );
                }
                let samples = if k > 1 {
                    debug!(channel = %analog.label, factor = k, "upsampling");
                    upsample(&analog.samples, k)
                } else {
                    std::mem::take(&mut analog.samples)
                };
                analog.with_resampled(samples, analog_frequency)
            })
            .collect()
    }

    fn fit_analogs(&self, analogs: &mut [AnalogChannel], timeline: &Timeline, warnings: &mut Warnings) {
        let target = timeline.frames * timeline.samples_per_frame;
        let half_period = 0.5 / timeline.analog_frequency;
        for analog in analogs.iter_mut() {
            let before = analog.len();
            if fit_length(&mut analog.samples, target) {
                warnings.warn(
                    WarningKind::AnalogLengthAdjusted,
                    format!(
                        "analog '{}' resized from {} to {} samples",
                        analog.label, before, target
                    ),
                );
            }
            let offset = analog.start_time - timeline.start_time;
            if offset.abs() > half_period {
                warnings.warn(
                    WarningKind::AnalogStartOffset,
                    format!(
                        "analog '{}' starts {:.6} s away from the reference",
                        analog.label, offset
                    ),
                );
            }
        }
    }
}

/// Flatten the groups, resolving inherited rates and start times
fn resolve_timing(groups: Vec<ChannelGroup>) -> Result<(Vec<MarkerChannel>, Vec<AnalogChannel>)> {
    let mut markers = Vec::new();
    let mut analogs = Vec::new();
    for mut group in groups {
        for mut marker in std::mem::take(&mut group.markers) {
            let (rate, start_time) = resolve(&group, &marker.label, marker.rate, marker.start_time)?;
            marker.rate = rate;
            marker.start_time = start_time;
            markers.push(marker);
        }
        for mut analog in std::mem::take(&mut group.analogs) {
            let (rate, start_time) = resolve(&group, &analog.label, analog.rate, analog.start_time)?;
            analog.rate = rate;
            analog.start_time = start_time;
            analogs.push(analog);
        }
    }
    Ok((markers, analogs))
}

fn resolve(group: &ChannelGroup, label: &str, rate: f64, start_time: f64) -> Result<(f64, f64)> {
    let invalid = |rate| SyncError::InvalidRate {
        channel: label.to_string(),
        rate,
    };
    if !rate.is_finite() || rate < 0.0 {
        return Err(invalid(rate));
    }
    let (rate, start_time) = group.timing_of(rate, start_time);
    if !rate.is_finite() || rate <= 0.0 {
        return Err(invalid(rate));
    }
    Ok((rate, start_time))
}

fn timeline(clock: Option<&MarkerClock>, analog_frequency: f64, analogs: &[AnalogChannel]) -> Timeline {
    match clock {
        Some(clock) => Timeline {
            point_frequency: clock.rate,
            analog_frequency,
            samples_per_frame: if analogs.is_empty() {
                1
            } else {
                (analog_frequency / clock.rate).round().max(1.0) as usize
            },
            frames: clock.frames,
            first_frame: clock.first_frame,
            start_time: clock.start_time,
        },
        None => {
            let start_time = analogs
                .iter()
                .map(|a| a.start_time)
                .min_by(f64::total_cmp)
                .unwrap_or(0.0);
            Timeline {
                point_frequency: analog_frequency,
                analog_frequency,
                samples_per_frame: 1,
                frames: analogs.iter().map(Channel::len).max().unwrap_or(0),
                first_frame: (start_time * analog_frequency).round() as i32 + 1,
                start_time,
            }
        }
    }
}
