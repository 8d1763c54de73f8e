//! Synchronization report metrics
//!
//! Gauges and counters derived from a finished `SyncReport`, plus an
//! in-memory aggregator for summaries across several runs.

use std::collections::BTreeMap;

use contracts::{Severity, SyncReport};
use metrics::{counter, gauge, histogram};

/// Record metrics from one synchronizer report.
///
/// The synchronizer itself counts runs and warnings as they happen; this
/// records the shape of the resulting acquisition.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_sync_report;
///
/// let report = synchronizer.run(input)?;
/// record_sync_report(&report);
/// ```
pub fn record_sync_report(report: &SyncReport) {
    let acquisition = &report.acquisition;

    counter!("mocap_sync_reports_total").increment(1);

    gauge!("mocap_sync_point_frequency_hz").set(acquisition.point_frequency);
    gauge!("mocap_sync_analog_frequency_hz").set(acquisition.analog_frequency());
    gauge!("mocap_sync_point_frames").set(acquisition.point_frame_count as f64);
    gauge!("mocap_sync_analog_samples_per_frame").set(acquisition.analog_samples_per_frame as f64);
    gauge!("mocap_sync_point_channels").set(acquisition.points.len() as f64);
    gauge!("mocap_sync_analog_channels").set(acquisition.analogs.len() as f64);
    histogram!("mocap_sync_duration_seconds").record(acquisition.duration());

    for warning in &report.warnings {
        let severity = match warning.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        counter!(
            "mocap_sync_report_warnings_total",
            "kind" => warning.kind.as_str(),
            "severity" => severity
        )
        .increment(1);
    }
}

/// Synchronization metrics aggregator
#[derive(Debug, Clone, Default)]
pub struct SyncMetricsAggregator {
    pub total_runs: u64,

    /// Runs that produced at least one warning-severity entry
    pub runs_with_warnings: u64,

    pub frame_stats: RunningStats,

    pub point_frequency_stats: RunningStats,

    pub analog_frequency_stats: RunningStats,

    /// Warning counts by kind
    pub warning_counts: BTreeMap<String, u64>,
}

impl SyncMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, report: &SyncReport) {
        let acquisition = &report.acquisition;
        self.total_runs += 1;
        if report.has_warnings() {
            self.runs_with_warnings += 1;
        }
        for warning in &report.warnings {
            *self
                .warning_counts
                .entry(warning.kind.as_str().to_string())
                .or_insert(0) += 1;
        }

        self.frame_stats.push(acquisition.point_frame_count as f64);
        self.point_frequency_stats.push(acquisition.point_frequency);
        self.analog_frequency_stats.push(acquisition.analog_frequency());
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_runs: self.total_runs,
            runs_with_warnings: self.runs_with_warnings,
            warning_rate: if self.total_runs > 0 {
                self.runs_with_warnings as f64 / self.total_runs as f64 * 100.0
            } else {
                0.0
            },
            frames: StatsSummary::from(&self.frame_stats),
            point_frequency: StatsSummary::from(&self.point_frequency_stats),
            analog_frequency: StatsSummary::from(&self.analog_frequency_stats),
            warning_counts: self.warning_counts.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Aggregated summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_runs: u64,
    pub runs_with_warnings: u64,
    pub warning_rate: f64,
    pub frames: StatsSummary,
    pub point_frequency: StatsSummary,
    pub analog_frequency: StatsSummary,
    pub warning_counts: BTreeMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Sync Metrics Summary ===")?;
        writeln!(f, "Total runs: {}", self.total_runs)?;
        writeln!(
            f,
            "Runs with warnings: {} ({:.2}%)",
            self.runs_with_warnings, self.warning_rate
        )?;
        writeln!(f, "Frames: {}", self.frames)?;
        writeln!(f, "Point frequency (Hz): {}", self.point_frequency)?;
        writeln!(f, "Analog frequency (Hz): {}", self.analog_frequency)?;

        if !self.warning_counts.is_empty() {
            writeln!(f, "Warning counts:")?;
            for (kind, count) in &self.warning_counts {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
