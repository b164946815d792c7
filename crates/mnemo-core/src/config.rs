//! Request configuration resolution.
//!
//! Merges a caller's partial [`RequestConfig`] with the process-wide
//! [`Settings`] into a [`ResolvedConfig`]:
//!
//! - `thread_id` and `user_id` are required and never defaulted
//! - `delay_seconds` defaults to [`DEFAULT_DELAY_SECONDS`]
//! - `model` defaults to `Settings::default_model`
//! - every other caller key is carried through unchanged

use serde_json::Value;

use mnemo_types::config::{DEFAULT_DELAY_SECONDS, RESERVED_KEYS, RequestConfig, ResolvedConfig};
use mnemo_types::error::ResolveError;
use mnemo_types::settings::Settings;

/// Resolve a request configuration against the process settings.
///
/// Pure: the same request and settings always produce an equal result.
/// Default values are copied out of `settings`; no reference is retained.
///
/// # Errors
///
/// [`ResolveError::MissingField`] naming `thread_id` or `user_id` when either
/// is absent or empty (`thread_id` is checked first).
#[tracing::instrument(
    name = "ensure_configurable",
    skip_all,
    fields(
        thread_id = request.thread_id.as_deref().unwrap_or_default(),
        user_id = request.user_id.as_deref().unwrap_or_default(),
        extra_keys = request.extra.len(),
    )
)]
pub fn resolve_config(
    request: &RequestConfig,
    settings: &Settings,
) -> Result<ResolvedConfig, ResolveError> {
    let thread_id = required(request.thread_id.as_deref(), "thread_id")?;
    let user_id = required(request.user_id.as_deref(), "user_id")?;

    let delay_seconds = request.delay_seconds.unwrap_or(DEFAULT_DELAY_SECONDS);
    let model = request
        .model
        .clone()
        .unwrap_or_else(|| settings.default_model.clone());

    let mut extra = request.extra.clone();
    extra.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));

    tracing::debug!(delay_seconds, model = %model, "Resolved request config");

    Ok(ResolvedConfig {
        thread_id,
        user_id,
        delay_seconds,
        model,
        extra,
    })
}

/// Parse a runnable-style envelope (`{"configurable": {...}}`) and resolve it.
pub fn resolve_runnable(envelope: &Value, settings: &Settings) -> Result<ResolvedConfig, ResolveError> {
    let request = RequestConfig::from_runnable(envelope)?;
    resolve_config(&request, settings)
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, ResolveError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ResolveError::MissingField(field)),
    }
}
