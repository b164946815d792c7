//! Mnemo diagnostic CLI entry point.
//!
//! Binary name: `mnemo`
//!
//! Parses CLI arguments, initializes tracing and the process-wide settings,
//! then dispatches to the appropriate command handler.

mod cli;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use cli::resolve::ResolveArgs;
use cli::{Cli, Commands};
use mnemo_observe::tracing_setup::{init_tracing, shutdown_tracing};
use mnemo_types::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,mnemo=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Resolve {
            thread_id,
            user_id,
            delay,
            model,
            extra,
            config,
        } => {
            let args = ResolveArgs {
                thread_id,
                user_id,
                delay,
                model,
                extra,
                config,
            };
            cli::resolve::resolve(settings()?, args, cli.json)?;
        }

        Commands::Settings => {
            cli::settings::show_settings(settings()?, cli.json)?;
        }

        // Embedding needs no index settings
        Commands::Embed { text } => {
            cli::memory::embed(text, cli.json).await?;
        }

        Commands::Upsert { text, id, metadata } => {
            cli::memory::upsert(settings()?, text, id, metadata, cli.json).await?;
        }

        Commands::Query { text, top_k } => {
            cli::memory::query(settings()?, text, top_k, cli.json).await?;
        }

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "mnemo", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn settings() -> anyhow::Result<&'static Settings> {
    mnemo_infra::settings::global().context("Failed to load settings")
}
