use thiserror::Error;

/// Errors raised while loading the process-wide settings.
///
/// Fatal at startup: the process should not continue without valid settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{0}'")]
    MissingSetting(&'static str),

    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("failed to read settings from {path}: {reason}")]
    Source { path: String, reason: String },

    #[error("settings already initialized")]
    AlreadyInitialized,
}

/// Errors raised while resolving a request-scoped configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("malformed request config: {0}")]
    Malformed(String),
}

impl ResolveError {
    /// The name of the missing field, if this is a `MissingField` error.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ResolveError::MissingField(field) => Some(field),
            ResolveError::Malformed(_) => None,
        }
    }
}

/// The embedding model failed to initialize.
///
/// `Clone` so a single failed construction can be reported to every caller
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load embedding model '{model}': {reason}")]
pub struct ModelLoadError {
    pub model: String,
    pub reason: String,
}

/// Errors from embedding inference on an already-loaded model.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding inference failed: {0}")]
    Inference(String),

    #[error("embedding model returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },
}

/// Errors from the remote vector index service.
///
/// Propagated to the caller unmodified; this layer never retries.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector index service rejected the credential")]
    Unauthorized,

    #[error("vector index '{0}' not found")]
    NotFound(String),

    #[error("vector index service error (HTTP {status}): {body}")]
    Service { status: u16, body: String },

    #[error("vector index service unreachable: {0}")]
    Unreachable(String),

    #[error("invalid vector index response: {0}")]
    Decode(String),
}
