//! Reference command - fetch, cache, and inspect the item code/model table.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::Utc;
use clap::{Args, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ordex_core::models::config::ReferenceConfig;
use ordex_core::{
    CacheEntry, CsvReferenceSource, OrdexConfig, ReferenceCache, ReferenceError, ReferenceSource,
    ReferenceTable,
};

use super::config::load_config;

/// Arguments for the reference command.
#[derive(Args)]
pub struct ReferenceArgs {
    #[command(subcommand)]
    command: ReferenceCommand,
}

#[derive(Subcommand)]
enum ReferenceCommand {
    /// Show the cached reference table
    Show {
        /// Number of entries to print
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Fetch the reference table now and replace the cache
    Refresh {
        /// Reference source (URL or CSV path); defaults to the configured one
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Delete the cached reference table
    Clear,

    /// Show the cache file path
    Path,
}

/// Reference table persisted between runs, keyed by where it came from.
#[derive(Debug, Serialize, Deserialize)]
struct StoredReference {
    source: String,
    entry: CacheEntry<ReferenceTable>,
}

pub async fn run(args: ReferenceArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command {
        ReferenceCommand::Show { limit } => show_reference(&config, limit),
        ReferenceCommand::Refresh { source } => refresh_reference(&config, source.as_deref()).await,
        ReferenceCommand::Clear => clear_reference(),
        ReferenceCommand::Path => {
            println!("Reference cache: {}", cache_path().display());
            Ok(())
        }
    }
}

pub fn cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ordex")
        .join("reference.json")
}

/// Load the reference table for `process`.
///
/// No configured source yields an empty table. The on-disk cache is used
/// while fresh and only for the same source.
pub async fn load_reference(
    config: &OrdexConfig,
    source_override: Option<&str>,
    use_cache: bool,
) -> anyhow::Result<ReferenceTable> {
    let Some(source) = source_override.or(config.reference.source.as_deref()) else {
        warn!("No reference source configured");
        return Ok(ReferenceTable::empty());
    };

    if !use_cache || !config.reference.cache_enabled {
        debug!("Reference cache disabled");
        return Ok(fetch(source, &config.reference).await?);
    }

    let now = Utc::now();
    let mut cache = ReferenceCache::new(config.cache_ttl());
    if let Some(stored) = read_stored(&cache_path()) {
        if stored.source == source {
            cache = cache.with_entry(stored.entry);
        } else {
            debug!("Cached reference table is for {}, ignoring", stored.source);
        }
    }

    if let Some(table) = cache.get(now) {
        info!("Using cached reference table ({} entries)", table.len());
        return Ok(table.clone());
    }

    let table = if is_url(source) {
        let table = fetch_remote(source, &config.reference).await?;
        cache.store(table, now).clone()
    } else {
        let local = local_source(source, &config.reference);
        cache.get_or_fetch(now, || local.load())?.clone()
    };

    if let Some(entry) = cache.entry() {
        persist(source, entry);
    }

    Ok(table)
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn local_source(path: &str, config: &ReferenceConfig) -> CsvReferenceSource {
    CsvReferenceSource::new(path).with_columns(&config.item_code_column, &config.model_column)
}

async fn fetch(source: &str, config: &ReferenceConfig) -> Result<ReferenceTable, ReferenceError> {
    if is_url(source) {
        fetch_remote(source, config).await
    } else {
        let local = local_source(source, config);
        debug!("Reading reference table from {}", local.describe());
        local.load()
    }
}

async fn fetch_remote(url: &str, config: &ReferenceConfig) -> Result<ReferenceTable, ReferenceError> {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner);
    }
    pb.set_message("Fetching reference table...");
    pb.enable_steady_tick(StdDuration::from_millis(100));

    let body = download(url).await;
    pb.finish_and_clear();

    let body = body.map_err(|e| ReferenceError::Fetch(format!("{}: {}", url, e)))?;
    let table = ReferenceTable::from_csv_reader(body.as_bytes(), &config.item_code_column, &config.model_column)?;
    info!("Fetched {} reference entries from {}", table.len(), url);
    Ok(table)
}

async fn download(url: &str) -> reqwest::Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("ordex-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(StdDuration::from_secs(60))
        .build()?;

    client.get(url).send().await?.error_for_status()?.text().await
}

fn read_stored(path: &Path) -> Option<StoredReference> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(stored) => Some(stored),
        Err(e) => {
            warn!("Ignoring unreadable reference cache {}: {}", path.display(), e);
            None
        }
    }
}

fn write_stored(path: &Path, stored: &StoredReference) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(stored)?)?;
    Ok(())
}

fn persist(source: &str, entry: &CacheEntry<ReferenceTable>) {
    let stored = StoredReference {
        source: source.to_string(),
        entry: entry.clone(),
    };
    let path = cache_path();
    if let Err(e) = write_stored(&path, &stored) {
        warn!("Failed to write reference cache {}: {}", path.display(), e);
    }
}

fn show_reference(config: &OrdexConfig, limit: usize) -> anyhow::Result<()> {
    let path = cache_path();
    let Some(stored) = read_stored(&path) else {
        println!("{} No cached reference table.", style("ℹ").blue());
        println!("Run 'ordex reference refresh' to fetch one.");
        return Ok(());
    };

    let now = Utc::now();
    let age = stored.entry.age(now);
    let status = if stored.entry.is_fresh(now, config.cache_ttl()) {
        style("fresh").green()
    } else {
        style("expired").yellow()
    };

    println!("Source:  {}", stored.source);
    println!("Fetched: {} ({}s ago, {})", stored.entry.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"), age.num_seconds(), status);
    println!("Entries: {}", stored.entry.value.len());
    println!();

    for entry in stored.entry.value.entries().iter().take(limit) {
        println!("  {:<24} {}", entry.item_code, entry.model);
    }
    if stored.entry.value.len() > limit {
        println!("  ... {} more", stored.entry.value.len() - limit);
    }

    Ok(())
}

async fn refresh_reference(config: &OrdexConfig, source: Option<&str>) -> anyhow::Result<()> {
    let source = source
        .or(config.reference.source.as_deref())
        .ok_or_else(|| anyhow::anyhow!("No reference source configured. Pass --source or run 'ordex config set reference.source <URL>'."))?;

    let table = fetch(source, &config.reference).await?;
    let entry = CacheEntry::new(table, Utc::now());
    write_stored(
        &cache_path(),
        &StoredReference {
            source: source.to_string(),
            entry,
        },
    )?;

    println!(
        "{} Cached reference table from {}",
        style("✓").green(),
        source
    );

    Ok(())
}

fn clear_reference() -> anyhow::Result<()> {
    let path = cache_path();
    if path.exists() {
        fs::remove_file(&path)?;
        println!("{} Removed {}", style("✓").green(), path.display());
    } else {
        println!("{} No cached reference table.", style("ℹ").blue());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordex_core::reference::ReferenceEntry;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/sheet.csv"));
        assert!(is_url("http://localhost/ref"));
        assert!(!is_url("/data/reference.csv"));
    }

    #[test]
    fn test_stored_reference_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ordex").join("reference.json");
        let stored = StoredReference {
            source: "ref.csv".to_string(),
            entry: CacheEntry::new(
                ReferenceTable::new(vec![ReferenceEntry::new("ABC-100", "Alpha")]),
                Utc::now(),
            ),
        };

        write_stored(&path, &stored).unwrap();
        let loaded = read_stored(&path).unwrap();
        assert_eq!(loaded.source, "ref.csv");
        assert_eq!(loaded.entry, stored.entry);
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reference.json");
        fs::write(&path, "{not json").unwrap();
        assert!(read_stored(&path).is_none());
    }

    #[tokio::test]
    async fn test_load_without_source_is_empty() {
        let config = OrdexConfig::default();
        let table = load_reference(&config, None, false).await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_load_local_csv_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.csv");
        fs::write(&path, "Item Code,Model\nABC-100-X,Alpha\n").unwrap();

        let config = OrdexConfig::default();
        let table = load_reference(&config, path.to_str(), false).await.unwrap();
        assert_eq!(table.entries()[0].model, "Alpha");
    }
}
