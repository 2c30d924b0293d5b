//! `ordex` command line: turns spreadsheet order exports into paste-ready rows.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, process, reference};

/// Clean, classify, and enrich order exports keyed by PI number
#[derive(Parser)]
#[command(name = "ordex", author, version, about)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of the per-user one
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one order export, or two exports joined on the PI column
    Process(process::ProcessArgs),

    /// Inspect, refresh, or clear the cached item code/model table
    Reference(reference::ReferenceArgs),

    /// Show or edit the ordex configuration
    Config(config::ConfigArgs),
}

fn log_level(verbose: u8) -> Level {
    [Level::WARN, Level::INFO, Level::DEBUG]
        .get(usize::from(verbose))
        .copied()
        .unwrap_or(Level::TRACE)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the exported rows
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(log_level(cli.verbose))
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Reference(args) => reference::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
