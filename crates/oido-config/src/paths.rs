//! Default configuration file location.

use std::path::PathBuf;

/// Default path of the tuning file: `<config dir>/oido/tuning.toml`.
///
/// Returns `None` when the platform exposes no configuration directory
/// (e.g. stripped-down containers); callers fall back to built-in
/// defaults.
pub fn default_tuning_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("oido").join("tuning.toml"))
}
