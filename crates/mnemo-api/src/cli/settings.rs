//! `mnemo settings`: show the process-wide settings.

use anyhow::Result;
use console::style;

use mnemo_infra::filesystem::{resolve_data_dir, settings_path};
use mnemo_types::settings::Settings;

/// Print the loaded settings with the credential masked.
pub fn show_settings(settings: &Settings, json: bool) -> Result<()> {
    let data_dir = resolve_data_dir();
    let namespace = if settings.namespace.is_empty() {
        "(default)"
    } else {
        settings.namespace.as_str()
    };

    if json {
        let value = serde_json::json!({
            "index_api_key": settings.masked_api_key(),
            "index_name": settings.index_name,
            "namespace": settings.namespace,
            "default_model": settings.default_model,
            "index_api_url": settings.index_api_url,
            "settings_file": settings_path(&data_dir).display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("  {} Settings", style("⚙").bold());
    println!();
    println!("  {:<14} {}", style("api key").bold(), settings.masked_api_key());
    println!("  {:<14} {}", style("index").bold(), style(&settings.index_name).cyan());
    println!("  {:<14} {}", style("namespace").bold(), namespace);
    println!("  {:<14} {}", style("model").bold(), settings.default_model);
    println!("  {:<14} {}", style("api url").bold(), settings.index_api_url);
    println!(
        "  {:<14} {}",
        style("file").bold(),
        style(settings_path(&data_dir).display()).dim()
    );
    println!();

    Ok(())
}
