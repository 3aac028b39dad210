//! Oido Config - persisted tuning for the measurement engine.
//!
//! Every product-tuning constant in the engine - the tap reset gap, the
//! retained window, the jitter stability thresholds, the accuracy penalty,
//! the teardown guard ramp - is deliberate but underived; none of them
//! fall out of first principles. This crate keeps them as data in a TOML
//! file so they can be adjusted per deployment, with validation that names
//! the offending field instead of silently clamping.

mod error;
mod paths;

pub use error::{ConfigError, Result};
pub use paths::default_tuning_path;

use oido_engine::EngineConfig;
use oido_timing::{TapConfig, TrialConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tap-engine tuning section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TapTuning {
    /// A gap larger than this starts a new tap series, in milliseconds.
    pub reset_gap_ms: f64,
    /// Maximum retained tap events.
    pub window: usize,
    /// Jitter below this is "metronomic", in milliseconds.
    pub jitter_metronomic_ms: f64,
    /// Jitter below this (and above metronomic) is "solid".
    pub jitter_solid_ms: f64,
    /// Accuracy penalty in points per BPM of error.
    pub accuracy_penalty_per_bpm: f64,
}

impl Default for TapTuning {
    fn default() -> Self {
        let config = TapConfig::default();
        Self {
            reset_gap_ms: config.reset_gap_ms,
            window: config.window,
            jitter_metronomic_ms: config.jitter_metronomic_ms,
            jitter_solid_ms: config.jitter_solid_ms,
            accuracy_penalty_per_bpm: config.accuracy_penalty_per_bpm,
        }
    }
}

/// Trial-sequencer tuning section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialTuning {
    /// Countdown steps before the Go cue.
    pub countdown_steps: u8,
    /// Interval between countdown steps, in milliseconds.
    pub step_ms: f64,
}

impl Default for TrialTuning {
    fn default() -> Self {
        let config = TrialConfig::default();
        Self {
            countdown_steps: config.countdown_steps,
            step_ms: config.step_ms,
        }
    }
}

/// Engine tuning section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineTuning {
    /// Teardown/startup gain guard ramp in milliseconds.
    pub guard_ramp_ms: f32,
    /// Smoothing ramp for routine gain changes, in milliseconds.
    pub gain_ramp_ms: f32,
    /// Noise buffer length in milliseconds.
    pub noise_buffer_ms: f32,
    /// Scope ring capacity in frames.
    pub scope_frames: usize,
}

impl Default for EngineTuning {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            guard_ramp_ms: config.guard_ramp_ms,
            gain_ramp_ms: config.gain_ramp_ms,
            noise_buffer_ms: config.noise_buffer_ms,
            scope_frames: config.scope_frames,
        }
    }
}

/// Complete tuning document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Tap-engine constants.
    pub tap: TapTuning,
    /// Trial-sequencer constants.
    pub trial: TrialTuning,
    /// Engine constants.
    pub engine: EngineTuning,
}

impl Tuning {
    /// Load tuning from a TOML file, validating it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning: Tuning = toml::from_str(&text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Save tuning to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::WriteFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every value, naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.tap.reset_gap_ms <= 0.0 {
            return Err(ConfigError::invalid("tap.reset_gap_ms", "must be positive"));
        }
        if self.tap.window < 2 {
            return Err(ConfigError::invalid("tap.window", "must be at least 2"));
        }
        if self.tap.jitter_metronomic_ms <= 0.0 {
            return Err(ConfigError::invalid(
                "tap.jitter_metronomic_ms",
                "must be positive",
            ));
        }
        if self.tap.jitter_solid_ms <= self.tap.jitter_metronomic_ms {
            return Err(ConfigError::invalid(
                "tap.jitter_solid_ms",
                "must be greater than jitter_metronomic_ms",
            ));
        }
        if self.tap.accuracy_penalty_per_bpm <= 0.0 {
            return Err(ConfigError::invalid(
                "tap.accuracy_penalty_per_bpm",
                "must be positive",
            ));
        }
        if self.trial.countdown_steps == 0 {
            return Err(ConfigError::invalid(
                "trial.countdown_steps",
                "must be at least 1",
            ));
        }
        if self.trial.step_ms <= 0.0 {
            return Err(ConfigError::invalid("trial.step_ms", "must be positive"));
        }
        if self.engine.guard_ramp_ms < 1.0 {
            return Err(ConfigError::invalid(
                "engine.guard_ramp_ms",
                "must be at least 1 ms to avoid audible clicks",
            ));
        }
        if self.engine.gain_ramp_ms <= 0.0 {
            return Err(ConfigError::invalid(
                "engine.gain_ramp_ms",
                "must be positive",
            ));
        }
        if self.engine.noise_buffer_ms < 2000.0 {
            return Err(ConfigError::invalid(
                "engine.noise_buffer_ms",
                "must be at least 2000 ms to hide the loop point",
            ));
        }
        if !self.engine.scope_frames.is_power_of_two() {
            return Err(ConfigError::invalid(
                "engine.scope_frames",
                "must be a power of two",
            ));
        }
        Ok(())
    }

    /// The tap configuration this tuning describes.
    pub fn tap_config(&self) -> TapConfig {
        TapConfig {
            reset_gap_ms: self.tap.reset_gap_ms,
            window: self.tap.window,
            jitter_metronomic_ms: self.tap.jitter_metronomic_ms,
            jitter_solid_ms: self.tap.jitter_solid_ms,
            accuracy_penalty_per_bpm: self.tap.accuracy_penalty_per_bpm,
        }
    }

    /// The trial configuration this tuning describes.
    pub fn trial_config(&self) -> TrialConfig {
        TrialConfig {
            countdown_steps: self.trial.countdown_steps,
            step_ms: self.trial.step_ms,
        }
    }

    /// The engine configuration this tuning describes.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            guard_ramp_ms: self.engine.guard_ramp_ms,
            gain_ramp_ms: self.engine.gain_ramp_ms,
            noise_buffer_ms: self.engine.noise_buffer_ms,
            scope_frames: self.engine.scope_frames,
            ..EngineConfig::default()
        }
    }
}
