//! Process-wide audio device handle.
//!
//! The platform audio context is a scarce, effectively singleton resource
//! with a gesture-gated lifecycle: it exists but cannot make sound until an
//! explicit user interaction unlocks it. Rather than a lazily initialized
//! global, the engine models it as an explicit [`AudioDeviceHandle`] that
//! sessions borrow; frequency preconditions are centralized here so range
//! violations are rejected uniformly instead of clamped at call sites.

use crate::error::{EngineError, Result};

/// Lifecycle state of the output device.
///
/// `Uninitialized -> (first user gesture) -> Ready -> Closed`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceState {
    /// Created but gesture-gated; starting a session now leaves it
    /// suspended.
    #[default]
    Uninitialized,
    /// Unlocked and able to produce sound.
    Ready,
    /// Released; terminal.
    Closed,
}

/// Handle to the platform audio output device.
///
/// # Example
///
/// ```rust
/// use oido_engine::{AudioDeviceHandle, DeviceState};
///
/// let mut device = AudioDeviceHandle::new(48000.0);
/// assert_eq!(device.state(), DeviceState::Uninitialized);
///
/// device.unlock().unwrap(); // the user gesture
/// assert_eq!(device.state(), DeviceState::Ready);
/// assert_eq!(device.nyquist_hz(), 24000.0);
/// ```
#[derive(Debug, Clone)]
pub struct AudioDeviceHandle {
    state: DeviceState,
    sample_rate: f32,
}

impl AudioDeviceHandle {
    /// Create a handle for a device running at `sample_rate` Hz.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: DeviceState::Uninitialized,
            sample_rate,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Device sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Highest representable frequency: half the sample rate.
    pub fn nyquist_hz(&self) -> f32 {
        self.sample_rate / 2.0
    }

    /// Unlock the device following a user gesture.
    ///
    /// Idempotent while the device is alive; a closed device cannot be
    /// reopened.
    pub fn unlock(&mut self) -> Result<()> {
        match self.state {
            DeviceState::Uninitialized => {
                tracing::info!(sample_rate = self.sample_rate, "audio device unlocked");
                self.state = DeviceState::Ready;
                Ok(())
            }
            DeviceState::Ready => Ok(()),
            DeviceState::Closed => Err(EngineError::DeviceUnavailable(
                "device has been closed".to_string(),
            )),
        }
    }

    /// Release the device. Terminal.
    pub fn close(&mut self) {
        self.state = DeviceState::Closed;
    }

    /// Validate a stimulus frequency against the device.
    ///
    /// Rejects non-positive and above-Nyquist frequencies with
    /// [`EngineError::FrequencyOutOfRange`]. Used for parameter updates on
    /// live sessions.
    pub fn validate_frequency(&self, frequency_hz: f32) -> Result<()> {
        let nyquist = self.nyquist_hz();
        if frequency_hz <= 0.0 || frequency_hz > nyquist {
            return Err(EngineError::FrequencyOutOfRange {
                requested_hz: frequency_hz,
                nyquist_hz: nyquist,
            });
        }
        Ok(())
    }

    /// Check that the device's rate can carry a test that needs
    /// frequencies up to `max_hz`.
    ///
    /// Surfaces [`EngineError::SampleRateTooLow`] as a hard precondition
    /// failure before a session starts, never as a silent clamp.
    pub fn ensure_supports(&self, max_hz: f32) -> Result<()> {
        let nyquist = self.nyquist_hz();
        if max_hz > nyquist {
            return Err(EngineError::SampleRateTooLow {
                sample_rate_hz: self.sample_rate,
                requested_hz: max_hz,
                nyquist_hz: nyquist,
            });
        }
        Ok(())
    }
}
