//! Request-scoped configuration types.
//!
//! A [`RequestConfig`] is what the caller hands in for one request: the
//! conversation thread, the memory owner, optional overrides, and any other
//! keys the caller wants carried along. A [`ResolvedConfig`] is the same
//! data with every field guaranteed present.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ResolveError;

/// Delay before deferred memory processing runs, when the caller gives none.
pub const DEFAULT_DELAY_SECONDS: i64 = 60;

/// Field names owned by the configuration schema.
///
/// Extra keys with these names are dropped during resolution so the
/// schema fields always win.
pub const RESERVED_KEYS: &[&str] = &["thread_id", "user_id", "delay_seconds", "delay", "model"];

/// Partial configuration supplied with a single request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Conversation thread. Required at resolution time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    /// Owner of the memories. Required at resolution time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Override for the deferred-processing delay.
    #[serde(alias = "delay", skip_serializing_if = "Option::is_none")]
    pub delay_seconds: Option<i64>,

    /// Override for the language model identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Any other caller-supplied keys, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestConfig {
    /// Start a request config for the given thread and user.
    pub fn new(thread_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_delay_seconds(mut self, delay_seconds: i64) -> Self {
        self.delay_seconds = Some(delay_seconds);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Attach an extra pass-through key.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Parse a loosely-typed JSON object into a request config.
    ///
    /// Recognized keys must have the right type (`delay` / `delay_seconds`
    /// an integer, the rest strings); `null` counts as absent. Anything
    /// else lands in `extra`.
    pub fn from_value(value: Value) -> Result<Self, ResolveError> {
        if !value.is_object() {
            return Err(ResolveError::Malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| ResolveError::Malformed(e.to_string()))
    }

    /// Parse a runnable-style envelope: `{"configurable": {...}, ...}`.
    ///
    /// A missing `configurable` section yields an empty request config, which
    /// then fails resolution on the first required field.
    pub fn from_runnable(envelope: &Value) -> Result<Self, ResolveError> {
        match envelope.get("configurable") {
            Some(configurable) => Self::from_value(configurable.clone()),
            None if envelope.is_object() => Ok(Self::default()),
            None => Err(ResolveError::Malformed(format!(
                "expected a JSON object, got {}",
                json_kind(envelope)
            ))),
        }
    }
}

/// Fully-specified configuration for one request.
///
/// Every field is present; downstream consumers need no further defaulting.
/// Serializes as a flat object: the extra keys plus the four schema keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub thread_id: String,
    pub user_id: String,
    pub delay_seconds: i64,
    pub model: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResolvedConfig {
    /// Look up a pass-through key supplied by the caller.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
