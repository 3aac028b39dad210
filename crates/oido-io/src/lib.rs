//! Audio output layer for the oido measurement engine.
//!
//! The engine never talks to a platform audio API directly; it renders into
//! buffers handed to it through the [`OutputBackend`] trait. The default
//! implementation wraps [cpal](https://crates.io/crates/cpal); tests use the
//! deterministic [`MockBackend`], which captures everything the engine
//! renders.
//!
//! This crate is output-only by design: the measurement core plays stimuli
//! and observes taps. Input capture (microphone-based tests) lives behind a
//! separate collaborator with its own permission story.

pub mod backend;
pub mod cpal_backend;
pub mod mock;

pub use backend::{
    BackendStreamConfig, ErrorCallback, OutputBackend, OutputCallback, StreamHandle,
};
pub use cpal_backend::CpalBackend;
pub use mock::MockBackend;

/// Error types for audio output operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Stream setup or runtime error.
    #[error("audio stream error: {0}")]
    Stream(String),

    /// No audio output device available on the system.
    #[error("no audio output device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("output device not found: {0}")]
    DeviceNotFound(String),
}

/// Convenience result type for audio output operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Audio output device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}
