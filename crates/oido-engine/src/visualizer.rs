//! Pull-based visualizer sampling.
//!
//! Each session keeps a small ring of its most recent rendered frames. The
//! display loop pulls a snapshot once per frame while the session is
//! running - as waveform samples or as FFT magnitude bins - and gets empty
//! data immediately once the session stops. Nothing here blocks or waits
//! on the render path; failure here degrades visuals only.

use crate::engine::Engine;
use crate::session::{SessionId, SessionState};
use oido_analysis::{Window, magnitude_bins};

/// Fixed-capacity ring of recent mono frames.
#[derive(Debug, Clone)]
pub(crate) struct ScopeBuffer {
    samples: Vec<f32>,
    capacity: usize,
    write_pos: usize,
    filled: usize,
}

impl ScopeBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            capacity: capacity.max(1),
            write_pos: 0,
            filled: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, sample: f32) {
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.capacity;
        self.filled = (self.filled + 1).min(self.capacity);
    }

    /// Copy out the retained samples, oldest first.
    pub(crate) fn snapshot(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.filled);
        let start = (self.write_pos + self.capacity - self.filled) % self.capacity;
        for i in 0..self.filled {
            out.push(self.samples[(start + i) % self.capacity]);
        }
        out
    }
}

/// What the display wants from the sampler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualizerMode {
    /// Raw time-domain samples for an oscilloscope view.
    Waveform,
    /// FFT magnitude bins for a spectrum view.
    FrequencyBins,
}

/// One frame of visualizer data.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualizerFrame {
    /// Time-domain samples, oldest first.
    Waveform(Vec<f32>),
    /// Magnitude bins, DC through Nyquist.
    FrequencyBins(Vec<f32>),
    /// The session is not running; nothing to display.
    Empty,
}

/// Pull-based sampler over a session's scope ring.
///
/// # Example
///
/// ```rust
/// use oido_engine::{
///     AudioDeviceHandle, Engine, SessionSpec, VisualizerFrame, VisualizerMode,
///     VisualizerSampler,
/// };
///
/// let mut device = AudioDeviceHandle::new(48000.0);
/// device.unlock().unwrap();
/// let mut engine = Engine::new(device);
/// let id = engine.start_session(SessionSpec::tone(440.0)).unwrap();
///
/// let mut buffer = vec![0.0f32; 2048];
/// engine.render(&mut buffer);
///
/// let sampler = VisualizerSampler::new(1024);
/// let frame = sampler.sample(&engine, id, VisualizerMode::Waveform);
/// assert!(matches!(frame, VisualizerFrame::Waveform(_)));
/// ```
#[derive(Debug, Clone)]
pub struct VisualizerSampler {
    fft_size: usize,
}

impl VisualizerSampler {
    /// Create a sampler with the given FFT size (power of two).
    pub fn new(fft_size: usize) -> Self {
        Self { fft_size }
    }

    /// FFT size used for frequency frames.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Pull one frame of display data.
    ///
    /// Returns [`VisualizerFrame::Empty`] unless the session is `Running`.
    pub fn sample(&self, engine: &Engine, id: SessionId, mode: VisualizerMode) -> VisualizerFrame {
        let Some((state, samples)) = engine.scope_of(id) else {
            return VisualizerFrame::Empty;
        };
        if state != SessionState::Running {
            return VisualizerFrame::Empty;
        }

        match mode {
            VisualizerMode::Waveform => VisualizerFrame::Waveform(samples),
            VisualizerMode::FrequencyBins => {
                VisualizerFrame::FrequencyBins(magnitude_bins(&samples, self.fft_size, Window::Hann))
            }
        }
    }
}
