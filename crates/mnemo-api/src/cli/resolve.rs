//! `mnemo resolve`: show the configuration a request would run with.

use anyhow::{Context, Result};
use console::style;
use serde_json::{Map, Value};

use mnemo_core::config::resolve_config;
use mnemo_types::config::RequestConfig;
use mnemo_types::settings::Settings;

use super::parse_key_value;

/// Flags accepted by `mnemo resolve`.
pub struct ResolveArgs {
    pub thread_id: Option<String>,
    pub user_id: Option<String>,
    pub delay: Option<i64>,
    pub model: Option<String>,
    pub extra: Vec<String>,
    pub config: Option<String>,
}

/// Build a request config from `--config` JSON, then apply `--set` pairs,
/// then the dedicated flags.
///
/// `--config` may be a flat object or a `{"configurable": {...}}` envelope.
/// `--set` pairs are read through the same schema, so `--set delay=5` fills
/// the delay rather than landing in the pass-through keys.
pub fn build_request(args: ResolveArgs) -> Result<RequestConfig> {
    let mut request = match args.config.as_deref() {
        Some(raw) => {
            let value: Value = serde_json::from_str(raw).context("--config is not valid JSON")?;
            if value.get("configurable").is_some() {
                RequestConfig::from_runnable(&value)?
            } else {
                RequestConfig::from_value(value)?
            }
        }
        None => RequestConfig::default(),
    };

    if !args.extra.is_empty() {
        let mut pairs = Map::new();
        for raw in &args.extra {
            let (key, value) = parse_key_value(raw)?;
            pairs.insert(key, value);
        }
        let set = RequestConfig::from_value(Value::Object(pairs)).context("invalid --set value")?;
        overlay(&mut request, set);
    }

    if args.thread_id.is_some() {
        request.thread_id = args.thread_id;
    }
    if args.user_id.is_some() {
        request.user_id = args.user_id;
    }
    if args.delay.is_some() {
        request.delay_seconds = args.delay;
    }
    if args.model.is_some() {
        request.model = args.model;
    }
    Ok(request)
}

/// Copy every field present in `top` over `base`.
fn overlay(base: &mut RequestConfig, top: RequestConfig) {
    if top.thread_id.is_some() {
        base.thread_id = top.thread_id;
    }
    if top.user_id.is_some() {
        base.user_id = top.user_id;
    }
    if top.delay_seconds.is_some() {
        base.delay_seconds = top.delay_seconds;
    }
    if top.model.is_some() {
        base.model = top.model;
    }
    base.extra.extend(top.extra);
}

/// Resolve the request and print the result.
///
/// # Examples
///
/// ```bash
/// mnemo resolve --thread-id t1 --user-id u1
/// mnemo resolve --config '{"configurable": {"thread_id": "t1", "user_id": "u1", "delay": 5}}'
/// ```
pub fn resolve(settings: &Settings, args: ResolveArgs, json: bool) -> Result<()> {
    let request = build_request(args)?;
    let resolved = resolve_config(&request, settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    let source = |supplied: bool| {
        if supplied {
            style("(request)").dim()
        } else {
            style("(default)").dim()
        }
    };

    println!();
    println!("  {} Resolved configuration", style("✓").green().bold());
    println!();
    println!("  {:<14} {}", style("thread_id").bold(), resolved.thread_id);
    println!("  {:<14} {}", style("user_id").bold(), resolved.user_id);
    println!(
        "  {:<14} {} {}",
        style("delay_seconds").bold(),
        resolved.delay_seconds,
        source(request.delay_seconds.is_some())
    );
    println!(
        "  {:<14} {} {}",
        style("model").bold(),
        style(&resolved.model).cyan(),
        source(request.model.is_some())
    );
    for (key, value) in &resolved.extra {
        println!("  {:<14} {}", style(key).bold(), value);
    }
    println!();

    Ok(())
}
