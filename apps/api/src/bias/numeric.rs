//! Numeric guards applied at the boundary of every statistic.
//!
//! Analyzers never let NaN or infinities reach a `BiasFinding`: every rate, mean, p-value and
//! score passes through one of these helpers first.

/// Returns `value` when it is finite, otherwise `fallback`.
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Clamps a magnitude into `[0, 1]`, mapping non-finite input to 0.
pub fn unit_interval(value: f64) -> f64 {
    finite_or(value, 0.0).clamp(0.0, 1.0)
}

/// `numerator / denominator`, or 0 when the denominator is zero or the result is undefined.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or(numerator / denominator, 0.0)
}

pub fn mean(values: &[f64]) -> f64 {
    ratio(values.iter().sum(), values.len() as f64)
}

/// Unbiased sample variance (n − 1 denominator). Zero for fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    finite_or(ss / (values.len() - 1) as f64, 0.0)
}

pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Decimal places kept by `snap`.
const SNAP_SCALE: f64 = 1e9;

/// Rounds away representation noise such as `0.35 - 0.1 = 0.24999999999999997` so that
/// values compared against decimal thresholds land on the intended side.
pub fn snap(value: f64) -> f64 {
    finite_or((value * SNAP_SCALE).round() / SNAP_SCALE, 0.0)
}

/// Max − min over finite values. Zero for fewer than two finite values.
pub fn spread<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut count = 0usize;
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        count += 1;
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if count < 2 {
        return 0.0;
    }
    finite_or(hi - lo, 0.0)
}
