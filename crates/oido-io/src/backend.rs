//! Pluggable audio output backend abstraction.
//!
//! [`OutputBackend`] decouples the measurement engine from any specific
//! platform audio API. The trait is object-safe: callbacks are boxed
//! closures and stream handles are type-erased, so backends can be selected
//! at runtime (`Box<dyn OutputBackend>`):
//!
//! - **Desktop**: [`CpalBackend`](crate::CpalBackend) (ALSA, CoreAudio,
//!   WASAPI) - the default
//! - **Testing**: [`MockBackend`](crate::MockBackend), deterministic for CI
//!
//! The render callback runs on the platform's real-time audio thread.
//! Implementations on the engine side must not allocate, lock, or panic
//! inside it.

use crate::{AudioDevice, Result};

/// Configuration for building an output stream.
#[derive(Debug, Clone)]
pub struct BackendStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Number of audio channels.
    pub channels: u16,
    /// Optional device name filter (uses system default if `None`).
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 512,
            channels: 2,
            device_name: None,
        }
    }
}

/// Type-erased audio stream handle.
///
/// The stream is live while this handle exists; dropping it stops playback.
/// The inner value is `Box<dyn Send>`, keeping backend types out of engine
/// code.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wrap a backend-specific stream object, keeping it alive until drop.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Output render callback.
///
/// Invoked on the audio thread with a mutable buffer of interleaved f32
/// samples (`[L0, R0, L1, R1, ...]` for stereo) that must be filled.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Error callback, invoked with a human-readable message when the backend
/// encounters a streaming error.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Pluggable audio output backend.
pub trait OutputBackend: Send {
    /// Human-readable backend name ("cpal", "mock").
    fn name(&self) -> &str;

    /// List available output devices.
    fn list_output_devices(&self) -> Result<Vec<AudioDevice>>;

    /// The default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Build and start an output stream.
    ///
    /// `callback` is invoked per audio buffer to generate output samples;
    /// the returned [`StreamHandle`] keeps the stream alive and stops it on
    /// drop.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// The sample rate the backend would actually use for `config`.
    ///
    /// Backends that cannot honor the requested rate report the closest
    /// available one here so callers can run Nyquist preconditions against
    /// reality. Default: the requested rate unchanged.
    fn actual_sample_rate(&self, config: &BackendStreamConfig) -> u32 {
        config.sample_rate
    }
}
