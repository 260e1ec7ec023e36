//! Stateless numeric primitives used by the metrics engine.
//!
//! These are pure functions over slices; undefined inputs (`NaN` or `None`)
//! are skipped rather than propagated, mirroring how the summary statistics
//! ignore the missing first return.

/// Simple (arithmetic) return from `previous` to `current`.
///
/// Returns `None` when the ratio is undefined: a non-positive or non-finite
/// previous price, or a non-finite current price.
pub fn arith_return(current: f64, previous: f64) -> Option<f64> {
    if !(previous.is_finite() && previous > 0.0) || !current.is_finite() {
        return None;
    }
    Some(current / previous - 1.0)
}

fn defined(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|value| *value)
        .filter(|value| !value.is_nan())
        .collect()
}

/// Arithmetic mean of the defined values, `NaN` if there are none.
pub fn mean(values: &[Option<f64>]) -> f64 {
    let valid = defined(values);
    if valid.is_empty() {
        return f64::NAN;
    }
    valid.iter().sum::<f64>() / valid.len() as f64
}

/// Sample (n - 1) standard deviation of the defined values.
///
/// Needs at least two defined values, otherwise returns `NaN`.
pub fn sample_std_dev(values: &[Option<f64>]) -> f64 {
    let valid = defined(values);
    if valid.len() < 2 {
        return f64::NAN;
    }

    let n = valid.len() as f64;
    let mean = valid.iter().sum::<f64>() / n;
    let sum_squared_diff: f64 = valid.iter().map(|&value| (value - mean).powi(2)).sum();

    (sum_squared_diff / (n - 1.0)).sqrt()
}

/// Running maximum: element `i` is `max(values[0..=i])`.
pub fn running_max(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            peak
        })
        .collect()
}
