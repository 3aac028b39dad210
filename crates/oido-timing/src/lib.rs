//! Oido Timing - human response measurement.
//!
//! Two measurement layers share this crate:
//!
//! - [`ResponseTimingEngine`] - captures discrete tap events against a
//!   monotonic clock and derives tempo, jitter, and accuracy statistics
//!   over a bounded window
//! - [`TrialSequencer`] - the countdown -> stimulus -> response state
//!   machine shared by reaction-style tests
//!
//! Neither layer reads a clock itself: callers pass `now` from the same
//! monotonic source that schedules audio, so response timestamps and
//! stimulus times stay comparable.

pub mod tap;
pub mod trial;

pub use tap::{
    ResponseTimingEngine, SeriesSnapshot, Stability, Tap, TapConfig, TapListener,
};
pub use trial::{CueSink, TrialConfig, TrialCue, TrialPhase, TrialSequencer};
