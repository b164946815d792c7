//! Memory commands: embed, upsert, query.
//!
//! Each command loads the shared embedding model, and the index commands
//! build a fresh vector index handle from the settings.

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use mnemo_core::memory::embedder::Embedder;
use mnemo_core::memory::index::VectorIndex;
use mnemo_infra::vector::embedder::embedding_model;
use mnemo_infra::vector::pinecone::get_index;
use mnemo_observe::attrs::{OP_EMBED, OP_QUERY, OP_UPSERT, PROVIDER_FASTEMBED, PROVIDER_PINECONE};
use mnemo_types::index::IndexRecord;
use mnemo_types::settings::Settings;

use super::parse_key_value;

/// Metadata key holding the original text of a stored record.
const CONTENT_KEY: &str = "content";

/// Embed each text and print the vectors.
///
/// # Examples
///
/// ```bash
/// mnemo embed "The user prefers green tea."
/// mnemo embed "first" "second" --json
/// ```
pub async fn embed(texts: Vec<String>, json: bool) -> Result<()> {
    let model = embedding_model().await.context("Embedding model unavailable")?;

    let span = tracing::info_span!(
        "mnemo.operation",
        mnemo.operation.name = OP_EMBED,
        mnemo.provider.name = PROVIDER_FASTEMBED,
        mnemo.embedding.model = model.model_name(),
        inputs = texts.len(),
    );
    let vectors = model.embed(&texts).instrument(span).await?;

    if json {
        let out: Vec<Value> = texts
            .iter()
            .zip(&vectors)
            .map(|(text, vector)| serde_json::json!({ "text": text, "vector": vector }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} ({} dimensions)",
        style("✓").green().bold(),
        style(model.model_name()).cyan(),
        model.dimension()
    );
    for (text, vector) in texts.iter().zip(&vectors) {
        let preview: Vec<String> = vector.iter().take(4).map(|x| format!("{x:.4}")).collect();
        println!("  {} [{}, ...]", style(truncate(text, 48)).bold(), preview.join(", "));
    }
    println!();

    Ok(())
}

/// Embed `text` and upsert it into the index.
///
/// The stored metadata always carries the text and a creation timestamp;
/// `--meta` entries are added on top.
pub async fn upsert(
    settings: &Settings,
    text: String,
    id: Option<String>,
    metadata: Vec<String>,
    json: bool,
) -> Result<()> {
    let model = embedding_model().await.context("Embedding model unavailable")?;
    let vector = model.embed_one(&text).await?;

    let id = id.unwrap_or_else(|| Uuid::now_v7().to_string());
    let mut record = IndexRecord::new(id.clone(), vector)
        .with_metadata(CONTENT_KEY, text.clone())
        .with_metadata("created_at", Utc::now().to_rfc3339());
    for raw in &metadata {
        let (key, value) = parse_key_value(raw)?;
        record.metadata.insert(key, value);
    }

    let index = get_index(settings)
        .await
        .with_context(|| format!("Vector index '{}' unavailable", settings.index_name))?;

    let span = tracing::info_span!(
        "mnemo.operation",
        mnemo.operation.name = OP_UPSERT,
        mnemo.provider.name = PROVIDER_PINECONE,
        mnemo.index.name = %settings.index_name,
        mnemo.index.namespace = %index.namespace(),
    );
    let upserted = index.upsert(&[record]).instrument(span).await?;

    if json {
        let out = serde_json::json!({ "id": id, "upserted": upserted });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Stored '{}' as {}",
        style("✓").green().bold(),
        truncate(&text, 60),
        style(&id).cyan()
    );
    println!();

    Ok(())
}

/// Embed `text` and print its nearest neighbours from the index.
pub async fn query(settings: &Settings, text: String, top_k: usize, json: bool) -> Result<()> {
    let model = embedding_model().await.context("Embedding model unavailable")?;
    let vector = model.embed_one(&text).await?;

    let index = get_index(settings)
        .await
        .with_context(|| format!("Vector index '{}' unavailable", settings.index_name))?;

    let span = tracing::info_span!(
        "mnemo.operation",
        mnemo.operation.name = OP_QUERY,
        mnemo.provider.name = PROVIDER_PINECONE,
        mnemo.index.name = %settings.index_name,
        mnemo.index.namespace = %index.namespace(),
        top_k,
    );
    let matches = index.query(&vector, top_k).instrument(span).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!();
        println!(
            "  {} No matches in '{}'.",
            style("i").blue().bold(),
            style(&settings.index_name).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Score").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Content").fg(Color::White),
    ]);

    for m in &matches {
        let content = m
            .metadata
            .get(CONTENT_KEY)
            .and_then(Value::as_str)
            .unwrap_or("-");
        table.add_row(vec![
            Cell::new(format!("{:.3}", m.score)).fg(Color::Green),
            Cell::new(&m.id).fg(Color::Cyan),
            Cell::new(truncate(content, 80)),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Shorten `text` to at most `max` characters, marking the cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
