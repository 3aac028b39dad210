//! Math helpers shared across the engine.
//!
//! Level conversions, the constant-power pan law, and the interval
//! statistics backing tempo/jitter measurement. Allocation-free and
//! `no_std`-safe via `libm`.

use core::f32::consts::{FRAC_PI_4, LN_10};
use libm::{cosf, expf, logf, sinf, sqrt};

/// Convert decibels to linear gain (0 dB -> 1.0, -6 dB -> ~0.5).
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels. Input is floored at 1e-10.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Constant-power stereo pan law.
///
/// Maps `pan` in [-1, 1] (hard left to hard right) to `(left, right)` gains
/// along a quarter-circle, so perceived loudness stays constant across the
/// pan range: center is -3 dB per side, extremes are unity on one side and
/// zero on the other.
///
/// # Example
///
/// ```rust
/// use oido_core::constant_power_pan;
///
/// let (l, r) = constant_power_pan(0.0);
/// assert!((l - r).abs() < 1e-6);
/// assert!((l - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
///
/// let (l, r) = constant_power_pan(-1.0);
/// assert!((l - 1.0).abs() < 1e-6);
/// assert!(r.abs() < 1e-6);
/// ```
#[inline]
pub fn constant_power_pan(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (cosf(angle), sinf(angle))
}

/// Arithmetic mean of a set of intervals in milliseconds.
///
/// Returns `None` for an empty slice.
pub fn interval_mean(intervals: &[f64]) -> Option<f64> {
    if intervals.is_empty() {
        return None;
    }
    Some(intervals.iter().sum::<f64>() / intervals.len() as f64)
}

/// Sample standard deviation (n-1 denominator) of intervals.
///
/// The sample estimator is part of the measurement contract: a tap window
/// with intervals [500, 550, 450, 500] ms must report a jitter of ~40.8 ms.
/// Returns `None` with fewer than two intervals.
pub fn interval_stddev(intervals: &[f64]) -> Option<f64> {
    if intervals.len() < 2 {
        return None;
    }
    let mean = interval_mean(intervals)?;
    let sum_sq: f64 = intervals.iter().map(|x| (x - mean) * (x - mean)).sum();
    Some(sqrt(sum_sq / (intervals.len() - 1) as f64))
}
