//! Process-wide settings loader for Mnemo.
//!
//! Reads the optional `settings.toml` from the data directory (`~/.mnemo/`
//! in production), overlays environment variables on top, and validates the
//! result into an immutable [`Settings`]. Unlike most config in the data
//! directory, a malformed settings file is fatal: running against the wrong
//! index is worse than not starting.

use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use mnemo_types::error::ConfigError;
use mnemo_types::settings::{
    KEY_DEFAULT_MODEL, KEY_INDEX_API_KEY, KEY_INDEX_API_URL, KEY_INDEX_NAME, KEY_NAMESPACE,
    Settings,
};

use crate::filesystem::{resolve_data_dir, settings_path};

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Flat `settings.toml` contents. Every key is optional here; required keys
/// are enforced after the environment overlay.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    index_api_key: Option<String>,
    index_name: Option<String>,
    namespace: Option<String>,
    default_model: Option<String>,
    index_api_url: Option<String>,
}

impl SettingsFile {
    /// Look up a value by its environment key name.
    fn get(&self, key: &str) -> Option<String> {
        match key {
            KEY_INDEX_API_KEY => self.index_api_key.clone(),
            KEY_INDEX_NAME => self.index_name.clone(),
            KEY_NAMESPACE => self.namespace.clone(),
            KEY_DEFAULT_MODEL => self.default_model.clone(),
            KEY_INDEX_API_URL => self.index_api_url.clone(),
            _ => None,
        }
    }
}

/// Read `{data_dir}/settings.toml`, treating a missing file as empty.
fn read_settings_file(data_dir: &Path) -> Result<SettingsFile, ConfigError> {
    let path = settings_path(data_dir);

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No settings.toml found at {}, using environment only", path.display());
            return Ok(SettingsFile::default());
        }
        Err(err) => {
            return Err(ConfigError::Source {
                path: path.display().to_string(),
                reason: err.to_string(),
            });
        }
    };

    toml::from_str(&content).map_err(|err| ConfigError::Source {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

/// Load settings from `{data_dir}/settings.toml` overlaid with `env`.
///
/// `env` wins over the file for every key. Split out from
/// [`load_settings`] so the layering can be tested without touching the
/// real process environment.
pub fn load_settings_with<F>(data_dir: &Path, env: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file = read_settings_file(data_dir)?;
    Settings::from_lookup(|key| env(key).or_else(|| file.get(key)))
}

/// Load settings from `{data_dir}/settings.toml` and the process environment.
pub fn load_settings(data_dir: &Path) -> Result<Settings, ConfigError> {
    load_settings_with(data_dir, |key| std::env::var(key).ok())
}

/// Load settings from the default data directory and the environment.
///
/// Idempotent: without outside changes to the environment or the file,
/// every call returns equal settings.
pub fn load() -> Result<Settings, ConfigError> {
    load_settings(&resolve_data_dir())
}

/// The process-wide settings, loaded on first access.
///
/// # Errors
///
/// Returns the [`ConfigError`] from the first load if it fails; a later call
/// tries again.
pub fn global() -> Result<&'static Settings, ConfigError> {
    if let Some(settings) = SETTINGS.get() {
        return Ok(settings);
    }

    let loaded = load()?;
    tracing::info!(
        index_name = %loaded.index_name,
        namespace = %loaded.namespace,
        default_model = %loaded.default_model,
        "Loaded settings"
    );
    Ok(SETTINGS.get_or_init(|| loaded))
}

/// Install explicit process-wide settings instead of loading them.
///
/// # Errors
///
/// [`ConfigError::AlreadyInitialized`] if settings were already installed or
/// loaded.
pub fn init(settings: Settings) -> Result<&'static Settings, ConfigError> {
    SETTINGS
        .set(settings)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    SETTINGS.get().ok_or(ConfigError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use secrecy::{ExposeSecret, SecretString};
    use tempfile::TempDir;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn load_settings_from_file_only() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            settings_path(tmp.path()),
            r#"
index_api_key = "pk-file"
index_name = "membot"
namespace = "tenant-a"
"#,
        )
        .unwrap();

        let settings = load_settings_with(tmp.path(), no_env).unwrap();
        assert_eq!(settings.index_api_key.expose_secret(), "pk-file");
        assert_eq!(settings.index_name, "membot");
        assert_eq!(settings.namespace, "tenant-a");
        assert_eq!(settings.default_model, "gpt-3.5-turbo");
    }

    #[test]
    fn load_settings_env_overrides_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            settings_path(tmp.path()),
            r#"
index_api_key = "pk-file"
index_name = "membot"
default_model = "from-file"
"#,
        )
        .unwrap();

        let env = |key: &str| match key {
            KEY_INDEX_API_KEY => Some("pk-env".to_string()),
            KEY_DEFAULT_MODEL => Some("from-env".to_string()),
            _ => None,
        };
        let settings = load_settings_with(tmp.path(), env).unwrap();
        assert_eq!(settings.index_api_key.expose_secret(), "pk-env");
        assert_eq!(settings.index_name, "membot");
        assert_eq!(settings.default_model, "from-env");
    }

    #[test]
    fn load_settings_missing_file_uses_env() {
        let tmp = TempDir::new().unwrap();
        let env = |key: &str| match key {
            KEY_INDEX_API_KEY => Some("pk-env".to_string()),
            KEY_INDEX_NAME => Some("membot".to_string()),
            _ => None,
        };
        let settings = load_settings_with(tmp.path(), env).unwrap();
        assert_eq!(settings.index_name, "membot");
    }

    #[test]
    fn load_settings_without_credential_fails() {
        let tmp = TempDir::new().unwrap();
        let err = load_settings_with(tmp.path(), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting(KEY_INDEX_API_KEY)));
    }

    #[test]
    fn load_settings_malformed_file_fails() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(settings_path(tmp.path()), "this is not { valid toml !!!").unwrap();

        let err = load_settings_with(tmp.path(), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Source { .. }));
    }

    #[test]
    fn load_settings_unknown_key_fails() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(settings_path(tmp.path()), "pinecone_api_key = \"pk\"\n").unwrap();

        let err = load_settings_with(tmp.path(), no_env).unwrap_err();
        assert!(err.to_string().contains("pinecone_api_key"));
    }

    #[test]
    fn load_settings_is_repeatable() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            settings_path(tmp.path()),
            "index_api_key = \"pk\"\nindex_name = \"membot\"\n",
        )
        .unwrap();

        let first = load_settings_with(tmp.path(), no_env).unwrap();
        let second = load_settings_with(tmp.path(), no_env).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn init_installs_process_settings_once() {
        let installed = init(Settings {
            index_api_key: SecretString::from("pk-init".to_string()),
            index_name: "membot".to_string(),
            namespace: String::new(),
            default_model: "gpt-3.5-turbo".to_string(),
            index_api_url: "https://api.pinecone.io".to_string(),
        })
        .unwrap();

        let fetched = global().unwrap();
        assert!(std::ptr::eq(installed, fetched));

        let again = init(Settings {
            index_api_key: SecretString::from("pk-other".to_string()),
            index_name: "other".to_string(),
            namespace: String::new(),
            default_model: "gpt-3.5-turbo".to_string(),
            index_api_url: "https://api.pinecone.io".to_string(),
        });
        assert!(matches!(again, Err(ConfigError::AlreadyInitialized)));
        assert_eq!(global().unwrap().index_name, "membot");
    }
}
