//! Forward FFT with windowing.

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Analysis window applied before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// No windowing.
    Rectangular,
    /// Hann (raised cosine) - the default for display spectra.
    Hann,
}

impl Window {
    /// Apply the window in place.
    pub fn apply(&self, buffer: &mut [f32]) {
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                let n = buffer.len();
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos());
                    *sample *= w;
                }
            }
        }
    }
}

/// Forward FFT with a cached plan.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Plan a forward FFT of the given size.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    /// FFT size in samples.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Transform real input, returning the positive-frequency half of the
    /// spectrum (DC through Nyquist, `size/2 + 1` bins).
    ///
    /// Input shorter than the FFT size is zero-padded; longer input is
    /// truncated.
    pub fn forward(&self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> =
            input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer.truncate(self.size / 2 + 1);
        buffer
    }
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish()
    }
}

/// Windowed magnitude bins of a signal block.
///
/// The visualizer's frequency path: window, transform, take magnitudes.
/// Returns `fft_size/2 + 1` bins covering DC through Nyquist.
pub fn magnitude_bins(signal: &[f32], fft_size: usize, window: Window) -> Vec<f32> {
    let fft = Fft::new(fft_size);

    let mut windowed = signal.to_vec();
    windowed.resize(fft_size, 0.0);
    window.apply(&mut windowed);

    fft.forward(&windowed).iter().map(|c| c.norm()).collect()
}
