//! Process-wide settings for the memory layer.
//!
//! `Settings` holds the static operational parameters: the vector index
//! credential and location, and the default language model. It is built
//! once (see `mnemo_infra::settings`) and never mutated afterwards.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Environment key for the vector index API credential.
pub const KEY_INDEX_API_KEY: &str = "PINECONE_API_KEY";
/// Environment key for the vector index name.
pub const KEY_INDEX_NAME: &str = "PINECONE_INDEX_NAME";
/// Environment key for the namespace within the index.
pub const KEY_NAMESPACE: &str = "PINECONE_NAMESPACE";
/// Environment key for the default language model.
pub const KEY_DEFAULT_MODEL: &str = "MODEL";
/// Environment key for the index service control-plane URL.
pub const KEY_INDEX_API_URL: &str = "PINECONE_API_URL";

/// Default language model handed to downstream consumers.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default control-plane URL of the vector index service.
pub const DEFAULT_INDEX_API_URL: &str = "https://api.pinecone.io";

/// Static settings shared by every caller in the process.
///
/// The credential is a [`SecretString`] and never appears in `Debug` output.
pub struct Settings {
    pub index_api_key: SecretString,
    pub index_name: String,
    /// Partition within the index. Empty means the service default namespace.
    pub namespace: String,
    pub default_model: String,
    pub index_api_url: String,
}

impl Settings {
    /// Build settings from a key lookup (usually the environment).
    ///
    /// Values are trimmed and blank values count as absent. The credential
    /// and index name have no fallback: a missing value is a
    /// [`ConfigError::MissingSetting`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let index_api_key = get(KEY_INDEX_API_KEY).ok_or(ConfigError::MissingSetting(KEY_INDEX_API_KEY))?;
        let index_name = get(KEY_INDEX_NAME).ok_or(ConfigError::MissingSetting(KEY_INDEX_NAME))?;

        let index_api_url = get(KEY_INDEX_API_URL).unwrap_or_else(|| DEFAULT_INDEX_API_URL.to_string());
        if !index_api_url.starts_with("http://") && !index_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidSetting {
                key: KEY_INDEX_API_URL,
                reason: format!("'{index_api_url}' is not an http(s) URL"),
            });
        }

        Ok(Self {
            index_api_key: SecretString::from(index_api_key),
            index_name,
            namespace: get(KEY_NAMESPACE).unwrap_or_default(),
            default_model: get(KEY_DEFAULT_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            index_api_url: index_api_url.trim_end_matches('/').to_string(),
        })
    }

    /// The credential with all but the last four characters masked.
    pub fn masked_api_key(&self) -> String {
        let key = self.index_api_key.expose_secret();
        let visible: String = key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if key.chars().count() <= 4 {
            "****".to_string()
        } else {
            format!("****{visible}")
        }
    }
}

impl PartialEq for Settings {
    fn eq(&self, other: &Self) -> bool {
        self.index_api_key.expose_secret() == other.index_api_key.expose_secret()
            && self.index_name == other.index_name
            && self.namespace == other.namespace
            && self.default_model == other.default_model
            && self.index_api_url == other.index_api_url
    }
}

impl Eq for Settings {}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("index_api_key", &"[REDACTED]")
            .field("index_name", &self.index_name)
            .field("namespace", &self.namespace)
            .field("default_model", &self.default_model)
            .field("index_api_url", &self.index_api_url)
            .finish()
    }
}
