//! Band-limited oscillators for test stimuli.
//!
//! Phase-accumulator oscillators with PolyBLEP (Polynomial Band-Limited
//! Step) corrections on the discontinuous waveforms. Hearing tests drive
//! these well above 10 kHz, where naive square/saw aliasing would fold
//! audible artifacts back under the stimulus frequency and corrupt the
//! measurement.

use core::f32::consts::PI;
use libm::sinf;
use oido_core::SmoothedParam;

/// Time constant for post-creation frequency changes, in milliseconds.
///
/// An instant frequency jump on a running oscillator is audible as a click;
/// the sweep and hearing tests instead glide the frequency through a
/// smoothed parameter with this time constant.
pub const FREQUENCY_GLIDE_MS: f32 = 100.0;

/// The four canonical stimulus waveforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Pure fundamental, the reference stimulus for threshold tests.
    #[default]
    Sine,
    /// Odd harmonics, hollow timbre.
    Square,
    /// All harmonics, bright timbre.
    Sawtooth,
    /// Odd harmonics with 1/n^2 rolloff, soft timbre.
    Triangle,
}

/// Phase-accumulator oscillator with smoothed frequency.
///
/// # Example
///
/// ```rust
/// use oido_synth::{Oscillator, Waveform};
///
/// let mut osc = Oscillator::new(48000.0, 440.0);
/// osc.set_waveform(Waveform::Sine);
/// let sample = osc.advance();
/// assert!((-1.0..=1.0).contains(&sample));
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Phase position in [0.0, 1.0).
    phase: f32,
    /// Smoothed frequency in Hz; the target moves, the value glides.
    frequency: SmoothedParam,
    sample_rate: f32,
    waveform: Waveform,
}

impl Oscillator {
    /// Create an oscillator at the given sample rate and initial frequency.
    ///
    /// The initial frequency takes effect immediately; only subsequent
    /// [`set_frequency`](Self::set_frequency) calls glide.
    pub fn new(sample_rate: f32, frequency_hz: f32) -> Self {
        Self {
            phase: 0.0,
            frequency: SmoothedParam::new(frequency_hz, sample_rate, FREQUENCY_GLIDE_MS),
            sample_rate,
            waveform: Waveform::Sine,
        }
    }

    /// Glide toward a new frequency over the [`FREQUENCY_GLIDE_MS`] time
    /// constant.
    pub fn set_frequency(&mut self, frequency_hz: f32) {
        self.frequency.set_target(frequency_hz);
    }

    /// Jump to a new frequency with no glide.
    ///
    /// Sample-accurate parameter automation (sweeps) computes its own
    /// per-sample trajectory and writes it through here.
    pub fn set_frequency_immediate(&mut self, frequency_hz: f32) {
        self.frequency.set_immediate(frequency_hz);
    }

    /// The frequency the oscillator is gliding toward.
    pub fn target_frequency(&self) -> f32 {
        self.frequency.target()
    }

    /// The instantaneous (smoothed) frequency.
    pub fn current_frequency(&self) -> f32 {
        self.frequency.get()
    }

    /// Set the waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// The active waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Reset phase to the cycle start.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Generate the next sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let dt = (self.frequency.advance() / self.sample_rate).max(0.0);
        let phase = self.phase;

        let output = match self.waveform {
            Waveform::Sine => sinf(phase * 2.0 * PI),

            Waveform::Sawtooth => {
                let naive = 2.0 * phase - 1.0;
                naive - poly_blep(phase, dt)
            }

            Waveform::Square => {
                let naive = if phase < 0.5 { 1.0 } else { -1.0 };
                // Corrections at the rising edge (phase 0) and falling
                // edge (phase 0.5).
                naive + poly_blep(phase, dt) - poly_blep(wrap_unit(phase + 0.5), dt)
            }

            // The triangle's discontinuity is in the slope, not the value,
            // so its aliasing falls off at 12 dB/octave already; the naive
            // form is clean enough for stimulus use.
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
        };

        self.phase = wrap_unit(self.phase + dt);
        output
    }
}

/// Wrap a phase value into [0.0, 1.0).
#[inline]
fn wrap_unit(phase: f32) -> f32 {
    if phase >= 1.0 { phase - 1.0 } else { phase }
}

/// Second-order PolyBLEP correction near a step discontinuity.
///
/// Within one sample on either side of the step, returns the residual of a
/// two-piece quadratic fit to the ideal band-limited step; elsewhere zero.
///
/// # Arguments
/// * `t` - phase position in [0.0, 1.0), with the discontinuity at 0
/// * `dt` - phase increment per sample
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let n = t / dt;
        n + n - n * n - 1.0
    } else if t > 1.0 - dt {
        let n = (t - 1.0) / dt;
        n * n + n + n + 1.0
    } else {
        0.0
    }
}
