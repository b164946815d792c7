//! Data directory layout for Mnemo.
//!
//! The data directory holds the optional `settings.toml` and the embedding
//! model weight cache (`models/`).

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "MNEMO_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `MNEMO_DATA_DIR` environment variable
/// 2. `~/.mnemo` in the user's home directory
/// 3. `.mnemo` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".mnemo");
    }

    PathBuf::from(".mnemo")
}

/// Path of the settings file: `{data_dir}/settings.toml`.
pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.toml")
}

/// Directory where embedding model weights are cached: `{data_dir}/models`.
pub fn model_cache_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("models")
}
