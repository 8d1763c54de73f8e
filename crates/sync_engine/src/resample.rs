//! Analog upsampling

/// Upsample by an integer factor `k` with linear interpolation.
///
/// Output index `i` maps to native sample `i / k` with weight
/// `(i % k) / k` towards the next one. Native samples land unchanged on
/// multiples of `k`; after the last native sample the value is held.
pub(crate) fn upsample(samples: &[f64], k: usize) -> Vec<f64> {
    if k <= 1 || samples.is_empty() {
        return samples.to_vec();
    }
    let last = samples.len() - 1;
    (0..samples.len() * k)
        .map(|i| {
            let input = i / k;
            let sub = i % k;
            if sub == 0 || input >= last {
                return samples[input.min(last)];
            }
            let lambda = sub as f64 / k as f64;
            (1.0 - lambda) * samples[input] + lambda * samples[input + 1]
        })
        .collect()
}

/// Truncate or hold the last value to reach `target` samples.
/// Returns whether the length changed.
pub(crate) fn fit_length(samples: &mut Vec<f64>, target: usize) -> bool {
    let len = samples.len();
    if len == target {
        return false;
    }
    let hold = samples.last().copied().unwrap_or(0.0);
    samples.resize(target, hold);
    true
}
