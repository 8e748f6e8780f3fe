use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use tabulador::logging::{init_logging, LoggingConfig};
use tabulador::montos::{MontoMatch, MontoScanner};
use tabulador::{ExtractionError, ExtractorConfig, StructuredTable, TableExtractor};

#[derive(Parser)]
#[command(name = "extract_tables")]
#[command(about = "Extract structured tables and peso amounts from gazette HTML")]
struct Cli {
    /// Input HTML file
    input: PathBuf,

    /// Output file (optional, defaults to input_tables.{format})
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: json, markdown, or text
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Optional TOML config file (env vars are used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the monetary-amount scan
    #[arg(long)]
    no_montos: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Full per-document result persisted by the json format
#[derive(Serialize)]
struct ExtractionReport {
    source: String,
    extracted_at: String,
    text: String,
    tables: Vec<StructuredTable>,
    montos: Vec<MontoMatch>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    init_logging(&LoggingConfig {
        level: level.to_string(),
    });

    let config = match &cli.config {
        Some(path) => ExtractorConfig::load_from_file(path)?,
        None => ExtractorConfig::load_from_env(),
    };

    let html = std::fs::read_to_string(&cli.input)
        .map_err(|e| ExtractionError::file_io(cli.input.display().to_string(), e))?;
    println!("Read {} characters from {:?}", html.chars().count(), cli.input);

    let extractor = TableExtractor::with_config(config)?;
    let (text, tables) = extractor.extract(&html);
    println!("Found {} tables", tables.len());

    let montos = if cli.no_montos {
        Vec::new()
    } else {
        let scanner = MontoScanner::new()?;
        let montos = scanner.scan(&text);
        println!("Found {} peso amounts", montos.len());
        montos
    };

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input, &cli.format));

    match cli.format.as_str() {
        "json" => {
            let report = ExtractionReport {
                source: cli.input.display().to_string(),
                extracted_at: chrono::Utc::now().to_rfc3339(),
                text,
                tables,
                montos,
            };
            let json = serde_json::to_string_pretty(&report)?;
            std::fs::write(&output_path, json)
                .with_context(|| format!("writing {:?}", output_path))?;
            println!("Wrote JSON report to {:?}", output_path);
        }
        "markdown" => {
            let mut content = String::new();
            for table in &tables {
                content.push_str(&format!(
                    "## {}: {}\n\n{}\n\n",
                    table.id, table.title, table.markdown
                ));
            }
            std::fs::write(&output_path, content)
                .with_context(|| format!("writing {:?}", output_path))?;
            println!("Wrote {} tables to Markdown: {:?}", tables.len(), output_path);
        }
        "text" => {
            std::fs::write(&output_path, text)
                .with_context(|| format!("writing {:?}", output_path))?;
            println!("Wrote placeholder text to {:?}", output_path);
        }
        other => {
            return Err(ExtractionError::configuration(format!(
                "unsupported output format '{}', use json, markdown, or text",
                other
            ))
            .into());
        }
    }

    Ok(())
}

fn default_output(input: &Path, format: &str) -> PathBuf {
    let extension = match format {
        "markdown" => "md",
        "text" => "txt",
        _ => "json",
    };
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{}_tables.{}", stem, extension))
}
