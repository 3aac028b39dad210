//! CLI subcommand implementations.

pub mod devices;
pub mod play;
pub mod render;
pub mod tap;

use anyhow::Result;
use oido_config::Tuning;
use oido_engine::{AudioDeviceHandle, Engine};
use std::path::PathBuf;

/// Load tuning from an explicit path, the default location, or fall back
/// to built-in defaults when no file exists.
pub fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
    match path {
        Some(path) => Ok(Tuning::load(path)?),
        None => match oido_config::default_tuning_path() {
            Some(default) if default.exists() => Ok(Tuning::load(&default)?),
            _ => Ok(Tuning::default()),
        },
    }
}

/// Build an unlocked engine at the given sample rate.
///
/// Running a CLI command *is* the user gesture, so the device unlocks
/// immediately.
pub fn ready_engine(sample_rate: f32, tuning: &Tuning) -> Result<Engine> {
    let mut device = AudioDeviceHandle::new(sample_rate);
    device.unlock()?;
    Ok(Engine::with_config(device, tuning.engine_config()))
}
