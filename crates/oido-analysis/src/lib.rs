//! Oido Analysis - spectra for the visualizer.
//!
//! A thin layer over `rustfft` that turns a block of time-domain samples
//! into magnitude bins for display. Not safety-critical: the visualizer is
//! the only consumer, and its failure mode is degraded visuals.

mod fft;

pub use fft::{Fft, Window, magnitude_bins};
