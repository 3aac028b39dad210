//! Error types for the measurement engine.
//!
//! Device and permission failures are surfaced to callers as typed results.
//! Nothing in this taxonomy is ever thrown across the render boundary; the
//! audio path stays panic- and error-free by construction (validation
//! happens before a session starts or a parameter is accepted).

use thiserror::Error;

/// Errors the engine can return to its callers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The output device cannot be created, or is blocked pending a user
    /// gesture. Recoverable: retry after an explicit unlock.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device sample rate cannot reproduce the requested frequency.
    ///
    /// Hard precondition failure before a session starts; the engine never
    /// silently clamps the stimulus instead.
    #[error(
        "device sample rate {sample_rate_hz} Hz too low for a {requested_hz} Hz stimulus \
         (Nyquist limit {nyquist_hz} Hz)"
    )]
    SampleRateTooLow {
        /// Device sample rate in Hz.
        sample_rate_hz: f32,
        /// Requested stimulus frequency in Hz.
        requested_hz: f32,
        /// Highest representable frequency (half the sample rate).
        nyquist_hz: f32,
    },

    /// Requested frequency is non-positive or above the Nyquist limit.
    /// Rejected at call time rather than aliased.
    #[error("frequency {requested_hz} Hz out of range (0, {nyquist_hz}]")]
    FrequencyOutOfRange {
        /// Requested frequency in Hz.
        requested_hz: f32,
        /// Highest representable frequency for the device.
        nyquist_hz: f32,
    },

    /// An input-capturing collaborator was denied permission. Distinct from
    /// [`DeviceUnavailable`](Self::DeviceUnavailable): retrying without a
    /// permission change will not help.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Two sessions were observed running on the same handle. This is a
    /// programming error in the engine, not a user-facing condition.
    #[error("internal session conflict: two running sessions on one handle")]
    SessionConflict,

    /// The referenced session does not exist or has already been dropped.
    #[error("unknown session: {0}")]
    UnknownSession(u64),
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_useful_messages() {
        let err = EngineError::SampleRateTooLow {
            sample_rate_hz: 8000.0,
            requested_hz: 15000.0,
            nyquist_hz: 4000.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("8000"));
        assert!(msg.contains("15000"));
        assert!(msg.contains("4000"));
    }

    #[test]
    fn permission_and_device_errors_are_distinct() {
        let device = EngineError::DeviceUnavailable("autoplay blocked".into());
        let permission = EngineError::PermissionDenied("microphone".into());
        assert_ne!(device.to_string(), permission.to_string());
    }
}
