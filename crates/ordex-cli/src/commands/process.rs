//! Process command - clean, enrich, and reshape one or two order exports.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{info, warn};

use ordex_core::{ExportFormat, ExportLayout, OrderPipeline, ReferenceTable, Table};

use super::config::load_config;
use super::reference::load_reference;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input CSV export, optionally followed by a second export to join on PI
    #[arg(required = true, num_args = 1..=2, value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Reference table source (URL or CSV path), overriding the config
    #[arg(short, long)]
    reference: Option<String>,

    /// Output columns, in order (comma-separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "all_columns")]
    columns: Vec<String>,

    /// Output every column of the processed table
    #[arg(long)]
    all_columns: bool,

    /// List the columns of the processed table and exit
    #[arg(long)]
    list_columns: bool,

    /// Fetch the reference table even if a fresh cached copy exists
    #[arg(long)]
    no_cache: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV with a header row
    Csv,
    /// Tab-separated rows without a header, ready to paste into a sheet
    Tsv,
    /// JSON with headers and rows
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Tsv => ExportFormat::ClipboardTsv,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut tables = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        if !input.exists() {
            anyhow::bail!("Input file not found: {}", input.display());
        }
        info!("Reading {}", input.display());
        let table = Table::from_path(input)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input.display(), e))?;
        tables.push(table);
    }

    let reference = if tables.len() == 2 {
        match load_reference(&config, args.reference.as_deref(), !args.no_cache).await {
            Ok(reference) => reference,
            Err(e) => {
                warn!("Reference table unavailable: {}", e);
                eprintln!(
                    "{} Reference table unavailable ({}); MODEL will be empty.",
                    style("⚠").yellow(),
                    e
                );
                ReferenceTable::empty()
            }
        }
    } else {
        ReferenceTable::empty()
    };

    let pipeline = OrderPipeline::new(config.columns.clone());
    let result = pipeline.process(tables, &reference)?;
    info!(
        "Pipeline produced {} rows in {}ms",
        result.table.len(),
        result.processing_time_ms
    );

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    if args.list_columns {
        for header in result.table.headers() {
            println!("{}", header);
        }
        return Ok(());
    }

    let layout = ExportLayout::from_config(&config.export);
    let layout = if args.all_columns {
        layout.with_columns(result.table.headers().to_vec())
    } else if !args.columns.is_empty() {
        layout.with_columns(args.columns.iter().map(|c| c.trim().to_string()).collect())
    } else {
        layout
    };

    let shaped = layout.apply(&result.table)?;
    let mut output = layout.render(&shaped, args.format.into())?;
    if !output.ends_with('\n') {
        output.push('\n');
    }

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    eprintln!(
        "{} {} rows processed in {}ms",
        style("ℹ").blue(),
        shaped.len(),
        start.elapsed().as_millis()
    );

    Ok(())
}
