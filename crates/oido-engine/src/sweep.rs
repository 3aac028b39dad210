//! Scheduled frequency sweeps.
//!
//! A sweep ramps a session's frequency between two endpoints over a fixed
//! duration. Two consumers evaluate the same trajectory from the same
//! origin: the render path, sample-accurately from the audio clock, and the
//! display path, from the wall clock on each frame tick. Keeping one
//! formula evaluated against two clocks derived from a common start keeps
//! the audible and displayed values from drifting apart.

use libm::powf;

/// Interpolation curve of a sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SweepCurve {
    /// Equal ratio per unit time - perceptually uniform for frequency.
    #[default]
    Exponential,
    /// Equal difference per unit time.
    Linear,
}

/// State of one scheduled parameter ramp.
///
/// Created when a sweep-mode session starts; terminal once elapsed time
/// reaches the duration or the sweep is cancelled. After cancellation the
/// value freezes: later queries return the value at the moment of
/// cancellation and never resume advancing.
#[derive(Debug, Clone)]
pub struct SweepState {
    start_value: f32,
    end_value: f32,
    duration_ms: f64,
    start_clock_ms: f64,
    curve: SweepCurve,
    frozen: Option<f32>,
}

impl SweepState {
    /// Create a sweep starting now (per the caller's monotonic clock).
    pub fn new(
        start_value: f32,
        end_value: f32,
        duration_ms: f64,
        start_clock_ms: f64,
        curve: SweepCurve,
    ) -> Self {
        Self {
            start_value,
            end_value,
            duration_ms: duration_ms.max(1.0),
            start_clock_ms,
            curve,
            frozen: None,
        }
    }

    /// The sweep's starting value.
    pub fn start_value(&self) -> f32 {
        self.start_value
    }

    /// The sweep's ending value.
    pub fn end_value(&self) -> f32 {
        self.end_value
    }

    /// Total sweep duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// The curve in use.
    pub fn curve(&self) -> SweepCurve {
        self.curve
    }

    /// Value at a given elapsed time since the sweep started.
    ///
    /// Shared by both clock domains. Clamped to the [min, max] envelope of
    /// the endpoints, and pinned to the end value once elapsed reaches the
    /// duration. Cancellation freezes the value permanently.
    pub fn value_at_elapsed(&self, elapsed_ms: f64) -> f32 {
        if let Some(frozen) = self.frozen {
            return frozen;
        }

        let t = (elapsed_ms / self.duration_ms).clamp(0.0, 1.0) as f32;
        let value = match self.curve {
            SweepCurve::Exponential => {
                self.start_value * powf(self.end_value / self.start_value, t)
            }
            SweepCurve::Linear => self.start_value + (self.end_value - self.start_value) * t,
        };

        let lo = self.start_value.min(self.end_value);
        let hi = self.start_value.max(self.end_value);
        value.clamp(lo, hi)
    }

    /// Value at a wall-clock timestamp (display path).
    pub fn value_at(&self, now_ms: f64) -> f32 {
        self.value_at_elapsed(now_ms - self.start_clock_ms)
    }

    /// Whether the sweep has run its full duration at `now_ms`.
    ///
    /// A cancelled sweep is terminal but never *complete*; completion
    /// drives auto-stop, cancellation already stopped the session.
    pub fn is_complete(&self, now_ms: f64) -> bool {
        self.frozen.is_none() && now_ms - self.start_clock_ms >= self.duration_ms
    }

    /// Same completion check against an elapsed time (audio clock path).
    pub fn is_complete_at_elapsed(&self, elapsed_ms: f64) -> bool {
        self.frozen.is_none() && elapsed_ms >= self.duration_ms
    }

    /// Cancel the sweep, freezing its value as of `now_ms`. Idempotent.
    pub fn cancel(&mut self, now_ms: f64) {
        if self.frozen.is_none() {
            self.frozen = Some(self.value_at(now_ms));
        }
    }

    /// Whether the sweep was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.frozen.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The hearing-age descent: 22 kHz down to 8 kHz over 15 s.
    fn hearing_sweep() -> SweepState {
        SweepState::new(22000.0, 8000.0, 15000.0, 0.0, SweepCurve::Exponential)
    }

    #[test]
    fn endpoints_are_exact() {
        let sweep = hearing_sweep();
        assert!((sweep.value_at(0.0) - 22000.0).abs() < 0.5);
        assert!((sweep.value_at(15000.0) - 8000.0).abs() < 0.5);
    }

    #[test]
    fn exponential_descent_is_monotonic() {
        let sweep = hearing_sweep();
        let mut prev = sweep.value_at(0.0);
        for step in 1..=150 {
            let value = sweep.value_at(step as f64 * 100.0);
            assert!(value <= prev, "not monotone at step {step}: {prev} -> {value}");
            prev = value;
        }
    }

    #[test]
    fn exponential_midpoint_is_geometric_mean() {
        let sweep = hearing_sweep();
        let mid = sweep.value_at(7500.0);
        let geometric = (22000.0f32 * 8000.0).sqrt();
        assert!((mid - geometric).abs() < 2.0, "mid {mid} vs {geometric}");
    }

    #[test]
    fn linear_midpoint_is_arithmetic_mean() {
        let sweep = SweepState::new(100.0, 200.0, 1000.0, 0.0, SweepCurve::Linear);
        assert!((sweep.value_at(500.0) - 150.0).abs() < 1e-3);
    }

    #[test]
    fn value_pins_after_completion() {
        let sweep = hearing_sweep();
        assert!((sweep.value_at(20_000.0) - 8000.0).abs() < 0.5);
        assert!(sweep.is_complete(15_000.0));
        assert!(!sweep.is_complete(14_999.0));
    }

    #[test]
    fn value_clamps_before_start() {
        let sweep = SweepState::new(100.0, 400.0, 1000.0, 500.0, SweepCurve::Linear);
        // Query before the recorded start never extrapolates.
        assert_eq!(sweep.value_at(0.0), 100.0);
    }

    #[test]
    fn cancellation_freezes_value() {
        let mut sweep = hearing_sweep();
        sweep.cancel(7500.0);

        let frozen = sweep.value_at(7500.0);
        assert_eq!(sweep.value_at(12_000.0), frozen);
        assert_eq!(sweep.value_at(100_000.0), frozen);
        assert!(sweep.is_cancelled());
        assert!(!sweep.is_complete(100_000.0));

        // Cancelling again changes nothing.
        sweep.cancel(14_000.0);
        assert_eq!(sweep.value_at(14_000.0), frozen);
    }

    #[test]
    fn audio_and_display_clocks_agree() {
        let sweep = SweepState::new(22000.0, 8000.0, 15000.0, 1234.0, SweepCurve::Exponential);
        for elapsed in [0.0, 1000.0, 7500.0, 14_000.0] {
            let by_wall = sweep.value_at(1234.0 + elapsed);
            let by_elapsed = sweep.value_at_elapsed(elapsed);
            assert_eq!(by_wall, by_elapsed);
        }
    }
}
