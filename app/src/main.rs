#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use glex_config::{Config, load_pattern_table};
use glex_core::{ExtractionEngine, Observation, prepare_text};
use serde::Deserialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "glex")]
#[command(about = "Gleason score extraction from pathology report text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract scores from texts
    Extract {
        /// JSON file with [{"text_id": 1, "text": "..."}] records
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Single text to process instead of a file
        #[arg(short, long)]
        text: Option<String>,

        /// Text id used with --text
        #[arg(long, default_value_t = 0)]
        text_id: i64,

        /// Config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pattern table JSON file; the built-in table when omitted
        #[arg(short, long)]
        patterns: Option<PathBuf>,

        /// Write output JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat input as already normalized text
        #[arg(long)]
        no_prepare: bool,
    },
    /// Print the built-in pattern table as JSON
    Patterns,
    /// Write a default config file
    Init {
        /// Where to write the config
        #[arg(default_value = "glex.json")]
        path: PathBuf,
    },
    /// Show version
    Version,
}

#[derive(Debug, Deserialize)]
struct TextRecord {
    text_id: i64,
    text: String,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            text,
            text_id,
            config,
            patterns,
            output,
            no_prepare,
        } => {
            let config = Config::load(config.as_deref())?;
            let table = load_pattern_table(patterns.as_deref())?;
            let engine = ExtractionEngine::new(config.to_engine_config(table))?;

            let mut texts = read_texts(input.as_deref(), text, text_id)?;
            if !no_prepare {
                for (_, text) in &mut texts {
                    *text = prepare_text(text);
                }
            }

            let rows = engine.extract_batch(&texts)?;
            info!(rows = rows.len(), "extraction finished");
            write_rows(&rows, output.as_deref())?;
        }
        Commands::Patterns => {
            let table = glex_core::default_patterns();
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
        Commands::Init { path } => {
            Config::write_default(&path)?;
        }
        Commands::Version => {
            println!("glex {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn read_texts(
    input: Option<&Path>,
    text: Option<String>,
    text_id: i64,
) -> anyhow::Result<Vec<(i64, String)>> {
    if let Some(text) = text {
        return Ok(vec![(text_id, text)]);
    }
    let Some(path) = input else {
        anyhow::bail!("either --input or --text is required");
    };
    let content = std::fs::read_to_string(path)?;
    let records: Vec<TextRecord> = serde_json::from_str(&content)?;
    Ok(records
        .into_iter()
        .map(|record| (record.text_id, record.text))
        .collect())
}

fn write_rows(rows: &[Observation], output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
