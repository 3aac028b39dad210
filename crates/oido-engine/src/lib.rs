//! Oido Engine - real-time stimulus playback and measurement sessions.
//!
//! The engine synthesizes precise acoustic stimuli (tones, noise, sweeps,
//! binaural pairs, orbiting sources), drives them through a low-latency
//! output path, and exposes the hooks the measurement layers observe. It
//! sits between `oido-synth` (what to play) and the platform output
//! backend (where to play it).
//!
//! # Core Abstractions
//!
//! - [`AudioDeviceHandle`] - the process-wide device capability with its
//!   gesture-gated `Uninitialized -> Ready -> Closed` lifecycle
//! - [`Engine`] / [`SessionSpec`] / [`SessionId`] - session orchestration
//!   with the one-running-session exclusivity invariant
//! - [`SweepState`] / [`SweepCurve`] - scheduled frequency ramps evaluated
//!   sample-accurately on the audio clock and per-frame on the wall clock
//! - [`Placement`] / [`OrbitParams`] - pan, polarity, and orbit placement
//! - [`VisualizerSampler`] - pull-based display sampling, gated by session
//!   state
//! - [`EngineError`] - the typed error taxonomy; nothing unwinds across
//!   the render callback
//!
//! # Clocks
//!
//! Two clocks are reconciled everywhere: the audio clock (a sample counter
//! advanced by [`Engine::render`]) and the caller's wall clock (passed
//! into [`Engine::tick`] and the sweep queries). Both are anchored at the
//! same start events, so audible and displayed values stay in step without
//! the display loop ever touching the render path.

pub mod device;
pub mod engine;
pub mod error;
pub mod score;
pub mod session;
pub mod spatial;
pub mod sweep;
pub mod visualizer;

pub use device::{AudioDeviceHandle, DeviceState};
pub use engine::{Engine, EngineConfig, SweepTickFn};
pub use error::{EngineError, Result};
pub use score::{MemoryScoreStore, ScoreStore};
pub use session::{AudioSession, SessionId, SessionSpec, SessionState, SourceSpec};
pub use spatial::{Channel, OrbitParams, Placement};
pub use sweep::{SweepCurve, SweepState};
pub use visualizer::{VisualizerFrame, VisualizerMode, VisualizerSampler};
