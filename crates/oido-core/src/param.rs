//! Smoothed parameters and gain ramps.
//!
//! Audible parameters never jump. A frequency change on a running oscillator
//! glides over roughly 100 ms ([`SmoothedParam`], one-pole exponential), and
//! a session being torn down ramps its gain to zero over a short guard
//! interval before the source is disconnected ([`LinearRamp`]), so neither
//! change produces a click.

use libm::expf;

/// One-pole exponentially smoothed parameter.
///
/// Moves toward its target with the difference equation
/// `y[n] = y[n-1] + coeff * (target - y[n-1])`, where the coefficient is
/// derived from a time constant in milliseconds. After one time constant the
/// value has covered ~63.2% of the distance; after five it is settled for
/// audio purposes.
///
/// # Example
///
/// ```rust
/// use oido_core::SmoothedParam;
///
/// // Frequency glide with the engine's 100 ms time constant.
/// let mut freq = SmoothedParam::new(440.0, 48000.0, 100.0);
/// freq.set_target(880.0);
/// let next = freq.advance();
/// assert!(next > 440.0 && next < 880.0);
/// ```
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
    sample_rate: f32,
    time_constant_ms: f32,
}

impl SmoothedParam {
    /// Create a smoothed parameter.
    ///
    /// A `time_constant_ms` of zero disables smoothing (instant changes).
    pub fn new(initial: f32, sample_rate: f32, time_constant_ms: f32) -> Self {
        let mut param = Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate,
            time_constant_ms,
        };
        param.recalculate_coeff();
        param
    }

    /// Set the value the parameter glides toward.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set and snap immediately, bypassing the glide.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    /// Change the time constant, keeping current and target values.
    pub fn set_time_constant_ms(&mut self, time_constant_ms: f32) {
        self.time_constant_ms = time_constant_ms;
        self.recalculate_coeff();
    }

    /// Update the sample rate, preserving the time constant.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the glide has effectively completed.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    fn recalculate_coeff(&mut self) {
        if self.time_constant_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples_per_tau = self.time_constant_ms / 1000.0 * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples_per_tau);
        }
    }
}

/// Fixed-duration linear ramp with completion detection.
///
/// Used for the teardown guard: when a session stops, its gain ramps to
/// zero over the guard interval and only once [`is_complete`] reports true
/// is the source disconnected.
///
/// [`is_complete`]: LinearRamp::is_complete
#[derive(Debug, Clone)]
pub struct LinearRamp {
    current: f32,
    target: f32,
    increment: f32,
    samples_remaining: u32,
}

impl LinearRamp {
    /// Create a ramp holding `value` with no transition in progress.
    pub fn hold(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            increment: 0.0,
            samples_remaining: 0,
        }
    }

    /// Begin a ramp from the current value to `target` over `duration_ms`.
    ///
    /// A zero or sub-sample duration snaps immediately.
    pub fn ramp_to(&mut self, target: f32, duration_ms: f32, sample_rate: f32) {
        let samples = (duration_ms / 1000.0 * sample_rate) as u32;
        self.target = target;
        if samples == 0 {
            self.current = target;
            self.increment = 0.0;
            self.samples_remaining = 0;
        } else {
            self.increment = (target - self.current) / samples as f32;
            self.samples_remaining = samples;
        }
    }

    /// Snap to a value, cancelling any ramp in progress.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.increment = 0.0;
        self.samples_remaining = 0;
    }

    /// Advance one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.increment;
            self.samples_remaining -= 1;
            if self.samples_remaining == 0 {
                // Snap to the exact target to absorb float accumulation.
                self.current = self.target;
            }
        }
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the ramp has reached its target.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.samples_remaining == 0
    }
}
