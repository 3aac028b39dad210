//! Deterministic mock backend for CI.
//!
//! Captures everything the engine renders instead of playing it. Tests
//! drive the "audio thread" explicitly with [`MockBackend::drive`], so
//! render behavior is reproducible sample-for-sample with no real device,
//! no timing dependence, and no audio hardware in CI.

use crate::backend::{
    BackendStreamConfig, ErrorCallback, OutputBackend, OutputCallback, StreamHandle,
};
use crate::{AudioDevice, Error, Result};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    callback: Option<OutputCallback>,
    captured: Vec<f32>,
    channels: u16,
}

/// Mock output backend capturing rendered samples.
///
/// # Example
///
/// ```rust
/// use oido_io::{BackendStreamConfig, MockBackend, OutputBackend};
///
/// let backend = MockBackend::new();
/// let _stream = backend
///     .build_output_stream(
///         &BackendStreamConfig::default(),
///         Box::new(|buffer| buffer.fill(0.25)),
///         Box::new(|_| {}),
///     )
///     .unwrap();
///
/// backend.drive(4);
/// assert_eq!(backend.captured().len(), 8); // 4 frames, stereo
/// ```
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    sample_rate: u32,
}

impl MockBackend {
    /// Create a mock backend reporting a 48 kHz device.
    pub fn new() -> Self {
        Self::with_sample_rate(48000)
    }

    /// Create a mock backend reporting an arbitrary device sample rate,
    /// for exercising Nyquist preconditions.
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            sample_rate,
        }
    }

    /// Invoke the registered render callback for `frames` frames, appending
    /// the result to the capture buffer. No-op when no stream is live.
    pub fn drive(&self, frames: usize) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let channels = state.channels.max(1) as usize;
        if let Some(callback) = state.callback.as_mut() {
            let mut buffer = vec![0.0f32; frames * channels];
            callback(&mut buffer);
            state.captured.extend_from_slice(&buffer);
        }
    }

    /// Everything rendered so far, interleaved.
    pub fn captured(&self) -> Vec<f32> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .captured
            .clone()
    }

    /// Discard the capture buffer.
    pub fn clear_captured(&self) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .captured
            .clear();
    }

    /// Whether a stream is currently live.
    pub fn has_stream(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .callback
            .is_some()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops the registered callback when the stream handle is dropped,
/// mirroring a real backend stopping playback.
struct MockStreamGuard {
    state: Arc<Mutex<MockState>>,
}

impl Drop for MockStreamGuard {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .callback = None;
    }
}

impl OutputBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn list_output_devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(vec![AudioDevice {
            name: "mock output".to_string(),
            default_sample_rate: self.sample_rate,
        }])
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        Ok(Some(AudioDevice {
            name: "mock output".to_string(),
            default_sample_rate: self.sample_rate,
        }))
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        _error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.callback.is_some() {
            return Err(Error::Stream("mock stream already live".to_string()));
        }
        state.callback = Some(callback);
        state.channels = config.channels;

        Ok(StreamHandle::new(MockStreamGuard {
            state: Arc::clone(&self.state),
        }))
    }

    fn actual_sample_rate(&self, _config: &BackendStreamConfig) -> u32 {
        self.sample_rate
    }
}
