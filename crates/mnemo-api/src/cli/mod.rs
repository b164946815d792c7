//! CLI command definitions and dispatch for the `mnemo` binary.
//!
//! Uses clap derive macros for argument parsing. Every command is a thin
//! wrapper over the library surface: config resolution, the shared
//! embedding model, and the vector index handle.

pub mod memory;
pub mod resolve;
pub mod settings;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use serde_json::Value;

/// Inspect and exercise the agent memory layer.
#[derive(Parser)]
#[command(name = "mnemo", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log errors only. Command output is still printed.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "MNEMO_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a request configuration against the current settings.
    Resolve {
        /// Conversation thread ID.
        #[arg(long)]
        thread_id: Option<String>,

        /// Memory owner ID.
        #[arg(long)]
        user_id: Option<String>,

        /// Deferred-processing delay override, in seconds.
        #[arg(long, allow_negative_numbers = true)]
        delay: Option<i64>,

        /// Model override.
        #[arg(long)]
        model: Option<String>,

        /// Extra pass-through key (repeatable). Values are parsed as JSON when possible.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        extra: Vec<String>,

        /// Base configuration as JSON: a flat object or `{"configurable": {...}}`.
        #[arg(long, value_name = "JSON")]
        config: Option<String>,
    },

    /// Show the loaded settings (credential masked).
    Settings,

    /// Embed text with the shared embedding model.
    Embed {
        /// Text to embed (one vector per argument).
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Embed text and store it in the vector index.
    #[command(alias = "remember")]
    Upsert {
        /// Text to store.
        text: String,

        /// Record ID (defaults to a new UUID v7).
        #[arg(long)]
        id: Option<String>,

        /// Metadata entry (repeatable). Values are parsed as JSON when possible.
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        metadata: Vec<String>,
    },

    /// Find the stored records nearest to a piece of text.
    #[command(alias = "recall")]
    Query {
        /// Query text.
        text: String,

        /// Number of matches to return.
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Parse a `KEY=VALUE` argument.
///
/// The value is read as JSON when it parses (`5`, `true`, `{"a":1}`), and as a
/// plain string otherwise.
pub fn parse_key_value(raw: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Empty key in '{raw}'");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
