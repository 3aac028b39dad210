//! Oido Synth - deterministic stimulus sources
//!
//! Produces the acoustic stimuli the measurement engine plays:
//!
//! - [`Oscillator`] - the four canonical waveforms (sine, square, sawtooth,
//!   triangle) with PolyBLEP band-limiting and a smoothed frequency
//!   parameter (~100 ms time constant) so frequency changes glide instead
//!   of clicking
//! - [`NoiseBuffer`] / [`NoisePlayer`] - precomputed, seeded, looped noise
//!   in three colors (white, pink, brown)
//! - [`BinauralPair`] - two sine oscillators routed hard-left/hard-right;
//!   the beat is perceptual, never synthesized
//!
//! Everything here is deterministic: the same construction parameters and
//! seed produce bit-identical output, which the noise idempotence tests
//! rely on.
//!
//! Frequency *validation* (Nyquist, non-positive) is deliberately not done
//! here; the engine crate centralizes those preconditions and returns typed
//! errors instead of clamping.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod binaural;
pub mod noise;
pub mod oscillator;

pub use binaural::BinauralPair;
pub use noise::{MIN_NOISE_BUFFER_MS, NoiseBuffer, NoiseColor, NoisePlayer};
pub use oscillator::{FREQUENCY_GLIDE_MS, Oscillator, Waveform};
