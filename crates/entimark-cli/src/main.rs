mod overrides;

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use entimark_core::{Entity, LineBreakMode, RenderOptions, Syntax, registry, render_with};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::overrides::TagOverrides;

#[derive(Parser)]
#[command(
    name = "entimark-cli",
    version,
    about = "Render a message and its entities into HTML or another markup syntax"
)]
struct Cli {
    /// Message JSON document; read from stdin when omitted
    input: Option<PathBuf>,

    /// Output syntax: html, markdown (md), docuwiki (dw) or text
    #[arg(short, long, env = "ENTIMARK_SYNTAX", default_value = "html")]
    syntax: String,

    /// Split output into paragraphs at line breaks
    #[arg(long)]
    paragraphs: bool,

    /// Clean HTML output against the tag allow-list
    #[arg(long)]
    sanitize: bool,

    /// TOML file with tag mapping overrides
    #[arg(long, env = "ENTIMARK_TAGS")]
    tags: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Input document: `{"text": "...", "entities": [...], "options": {...}}`.
#[derive(Deserialize)]
struct Message {
    text: String,
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    options: RenderOptions,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let output = run(&cli)?;
    print!("{}", output);
    Ok(())
}

fn run(cli: &Cli) -> Result<String> {
    let syntax: Syntax = cli.syntax.parse()?;

    let source = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => io::read_to_string(io::stdin()).context("failed to read stdin")?,
    };
    let message: Message = serde_json::from_str(&source).context("invalid message document")?;

    let mut options = message.options;
    if cli.paragraphs {
        options.line_breaks = LineBreakMode::Paragraphs;
    }
    if cli.sanitize {
        options.sanitize = true;
    }

    let mut registry = registry::snapshot();
    if let Some(path) = &cli.tags {
        TagOverrides::load(path)?.apply(&mut registry);
    }

    tracing::info!(
        syntax = %syntax,
        entities = message.entities.len(),
        "rendering message"
    );
    let output = render_with(&message.text, &message.entities, syntax, &registry, &options)?;
    Ok(output)
}
