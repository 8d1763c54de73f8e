//! Common analog frequency

use contracts::SynchronizerConfig;
use tracing::{debug, instrument};

use crate::error::{Result, SyncError};

/// `rate` divides `candidate` within a relative tolerance
fn divides(candidate: f64, rate: f64, tolerance: f64) -> bool {
    let remainder = candidate % rate;
    let slack = tolerance * candidate;
    remainder <= slack || rate - remainder <= slack
}

/// Smallest whole frequency every rate divides.
///
/// Searches upward in 1 Hz steps from the largest rate so fractional rates
/// still resolve; gives up past `max_analog_frequency`.
#[instrument(name = "sync_common_rate", skip(config), fields(limit = config.max_analog_frequency))]
pub fn derive_common_rate(rates: &[f64], config: &SynchronizerConfig) -> Result<f64> {
    let unresolvable = || SyncError::UnresolvableCommonRate {
        rates: rates.to_vec(),
        limit: config.max_analog_frequency,
    };
    if rates.iter().any(|r| !r.is_finite() || *r <= 0.0) {
        return Err(unresolvable());
    }
    let largest = rates.iter().copied().fold(0.0_f64, f64::max);
    if largest == 0.0 {
        return Err(unresolvable());
    }

    let mut candidate = largest.floor().max(1.0);
    while candidate <= config.max_analog_frequency {
        if rates
            .iter()
            .all(|&rate| divides(candidate, rate, config.rate_tolerance))
        {
            debug!(common = candidate, "common analog frequency");
            return Ok(candidate);
        }
        candidate += 1.0;
    }
    Err(unresolvable())
}

/// Integer factor taking `rate` to `common`, and whether it is exact
pub(crate) fn subsample_factor(common: f64, rate: f64, tolerance: f64) -> (usize, bool) {
    let ratio = common / rate;
    let factor = ratio.round().max(1.0);
    let exact = (ratio - factor).abs() <= tolerance * ratio;
    (factor as usize, exact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SynchronizerConfig {
        SynchronizerConfig::default()
    }

    #[test]
    fn test_lcm_of_marker_and_analog_rates() {
        assert_eq!(derive_common_rate(&[1000.0, 250.0, 100.0], &config()).unwrap(), 1000.0);
        assert_eq!(derive_common_rate(&[120.0, 100.0], &config()).unwrap(), 600.0);
        assert_eq!(derive_common_rate(&[100.0], &config()).unwrap(), 100.0);
    }

    #[test]
    fn test_fractional_rates() {
        assert_eq!(derive_common_rate(&[99.5], &config()).unwrap(), 199.0);
        assert_eq!(derive_common_rate(&[0.5], &config()).unwrap(), 1.0);
        // within tolerance of an integer
        assert_eq!(derive_common_rate(&[100.00000001, 50.0], &config()).unwrap(), 100.0);
    }

    #[test]
    fn test_search_limit() {
        let config = SynchronizerConfig {
            max_analog_frequency: 500.0,
            ..Default::default()
        };
        let err = derive_common_rate(&[120.0, 100.0], &config).unwrap_err();
        assert!(matches!(
            err,
            SyncError::UnresolvableCommonRate { limit, .. } if limit == 500.0
        ));
    }

    #[test]
    fn test_invalid_rates_rejected() {
        assert!(derive_common_rate(&[], &config()).is_err());
        assert!(derive_common_rate(&[100.0, 0.0], &config()).is_err());
        assert!(derive_common_rate(&[f64::NAN], &config()).is_err());
    }

    #[test]
    fn test_subsample_factor() {
        assert_eq!(subsample_factor(1000.0, 250.0, 1e-6), (4, true));
        assert_eq!(subsample_factor(1000.0, 1000.0, 1e-6), (1, true));
        assert_eq!(subsample_factor(1000.0, 300.0, 1e-6), (3, false));
    }
}
