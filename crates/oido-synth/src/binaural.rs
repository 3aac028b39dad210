//! Binaural beat pairs.
//!
//! Two independent sine oscillators at slightly different frequencies,
//! routed to dedicated hard-left/hard-right placements. The perceived beat
//! at the difference frequency is generated by the listener's brainstem;
//! nothing here synthesizes it.

use crate::oscillator::{Oscillator, Waveform};

/// A left/right pair of sine oscillators for binaural stimulation.
///
/// Typical usage puts the carriers in the low hundreds of Hz with a
/// difference of 1-30 Hz.
///
/// # Example
///
/// ```rust
/// use oido_synth::BinauralPair;
///
/// let mut pair = BinauralPair::new(48000.0, 200.0, 210.0);
/// assert_eq!(pair.beat_hz(), 10.0);
/// let (left, right) = pair.advance();
/// assert!((-1.0..=1.0).contains(&left) && (-1.0..=1.0).contains(&right));
/// ```
#[derive(Debug, Clone)]
pub struct BinauralPair {
    left: Oscillator,
    right: Oscillator,
}

impl BinauralPair {
    /// Create a pair with the given ear frequencies.
    pub fn new(sample_rate: f32, left_hz: f32, right_hz: f32) -> Self {
        let mut left = Oscillator::new(sample_rate, left_hz);
        let mut right = Oscillator::new(sample_rate, right_hz);
        left.set_waveform(Waveform::Sine);
        right.set_waveform(Waveform::Sine);
        Self { left, right }
    }

    /// Glide both ears to new frequencies.
    pub fn set_frequencies(&mut self, left_hz: f32, right_hz: f32) {
        self.left.set_frequency(left_hz);
        self.right.set_frequency(right_hz);
    }

    /// Left-ear target frequency in Hz.
    pub fn left_hz(&self) -> f32 {
        self.left.target_frequency()
    }

    /// Right-ear target frequency in Hz.
    pub fn right_hz(&self) -> f32 {
        self.right.target_frequency()
    }

    /// The perceptual beat frequency: the absolute ear difference.
    pub fn beat_hz(&self) -> f32 {
        (self.left.target_frequency() - self.right.target_frequency()).abs()
    }

    /// Generate the next (left, right) sample pair.
    #[inline]
    pub fn advance(&mut self) -> (f32, f32) {
        (self.left.advance(), self.right.advance())
    }
}
