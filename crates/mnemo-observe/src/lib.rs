//! Observability setup for Mnemo.
//!
//! Installs the global tracing subscriber (structured logs, optional
//! OpenTelemetry export) and names the span fields the memory layer records.

pub mod attrs;
pub mod tracing_setup;
