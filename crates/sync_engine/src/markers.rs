//! Marker rate and length reconciliation

use contracts::{Channel, MarkerChannel, SynchronizerConfig, WarningKind};
use tracing::{debug, instrument};

use crate::error::{MismatchKind, Result, SyncError};
use crate::warnings::Warnings;

/// Shared clock of the marker channels
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MarkerClock {
    pub rate: f64,
    pub start_time: f64,
    /// 1-based
    pub first_frame: i32,
    pub frames: usize,
}

/// `round(start_time * rate)`
fn frame_index(start_time: f64, rate: f64) -> i64 {
    (start_time * rate).round() as i64
}

/// Check every marker shares the first channel's clock, then pad the short
/// ones. Returns `None` when there are no markers.
#[instrument(name = "sync_markers", skip_all, fields(markers = markers.len()))]
pub(crate) fn reconcile(
    markers: Vec<MarkerChannel>,
    config: &SynchronizerConfig,
    warnings: &mut Warnings,
) -> Result<Option<(MarkerClock, Vec<MarkerChannel>)>> {
    let Some(reference) = markers.first() else {
        return Ok(None);
    };
    let rate = reference.rate;
    let start_time = reference.start_time;
    let first_index = frame_index(start_time, rate);

    for marker in &markers {
        if (marker.rate - rate).abs() > config.rate_tolerance * rate {
            return Err(SyncError::RateMismatch {
                channel: marker.label.clone(),
                kind: MismatchKind::Rate,
                reference: rate,
                found: marker.rate,
            });
        }
        let index = frame_index(marker.start_time, marker.rate);
        if index != first_index {
            return Err(SyncError::RateMismatch {
                channel: marker.label.clone(),
                kind: MismatchKind::FirstFrame,
                reference: (first_index + 1) as f64,
                found: (index + 1) as f64,
            });
        }
    }

    let frames = markers.iter().map(Channel::len).max().unwrap_or(0);
    let markers = markers
        .into_iter()
        .map(|marker| {
            if marker.len() < frames {
                warnings.warn(
                    WarningKind::FramePadded,
                    format!(
                        "marker '{}' padded from {} to {} frames",
                        marker.label,
                        marker.len(),
                        frames
                    ),
                );
                metrics::counter!("sync_padded_frames_total")
                    .increment((frames - marker.len()) as u64);
                marker.into_resized(frames)
            } else {
                marker
            }
        })
        .collect();

    let clock = MarkerClock {
        rate,
        start_time,
        first_frame: (first_index + 1) as i32,
        frames,
    };
    debug!(rate, frames, first_frame = clock.first_frame, "marker clock");
    Ok(Some((clock, markers)))
}
