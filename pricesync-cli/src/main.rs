//! pricesync CLI: sync, history, and status commands.
//!
//! Commands:
//! - `sync`: bring every registered asset up to date (incremental by default)
//! - `history`: print stored closes and RSI for one asset as JSON
//! - `status`: report stored row counts and date ranges per asset

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pricesync_core::data::YahooSource;
use pricesync_core::store::PriceStore;
use pricesync_core::sync::{sync_assets, SyncMode};
use pricesync_core::SyncConfig;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pricesync",
    about = "pricesync CLI: daily close and RSI collector"
)]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, default_value = "data.db")]
    db: PathBuf,

    /// Optional TOML config (epoch, RSI period, asset list).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch new daily closes, compute RSI, and upsert into the database.
    Sync {
        /// Re-fetch full history from the epoch instead of resuming.
        #[arg(long, default_value_t = false)]
        full: bool,
    },
    /// Print stored records for one asset as a JSON array.
    History {
        /// Asset id (e.g., BTC, VWRA).
        asset: String,
    },
    /// Report stored row counts and date ranges.
    Status,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync { full } => run_sync(&config, &cli.db, full),
        Commands::History { asset } => run_history(&config, &cli.db, &asset),
        Commands::Status => run_status(&config, &cli.db),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    match path {
        Some(path) => Ok(SyncConfig::from_file(path)?),
        None => Ok(SyncConfig::default()),
    }
}

/// Per-asset failures are logged and reported, never turned into a non-zero exit.
fn run_sync(config: &SyncConfig, db: &Path, full: bool) -> Result<()> {
    let mode = if full {
        SyncMode::Full
    } else {
        SyncMode::Incremental
    };

    tracing::info!(db = %db.display(), "Opening database");
    let mut store = PriceStore::open(db)
        .with_context(|| format!("failed to open database {}", db.display()))?;
    let source = YahooSource::new(config.request_timeout())?;
    let registry = config.registry()?;

    let summary = sync_assets(&source, &mut store, &registry, &config.sync_options(mode));

    println!();
    println!("Done! Total records processed: {}", summary.total_rows);
    if !summary.all_succeeded() {
        println!("{} asset(s) failed:", summary.failed);
        for (asset, err) in summary.errors() {
            println!("  {asset}: {err}");
        }
    }

    Ok(())
}

fn run_history(config: &SyncConfig, db: &Path, asset: &str) -> Result<()> {
    let registry = config.registry()?;
    let Some(entry) = registry.get(asset) else {
        bail!("unknown asset '{asset}'");
    };

    if !db.exists() {
        bail!(
            "database not found at {}; run `pricesync sync --full` first",
            db.display()
        );
    }

    let store = PriceStore::open(db)?;
    let rows = store.history(&entry.id)?;
    if rows.is_empty() {
        bail!("no data found for asset '{}'", entry.id);
    }

    let points: Vec<_> = rows
        .iter()
        .map(|r| {
            json!({
                "date": r.date.format("%Y-%m-%d").to_string(),
                "close": r.close,
                "rsi": r.rsi,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&points)?);
    tracing::info!(asset = %entry.id, rows = rows.len(), "Returned history");
    Ok(())
}

fn run_status(config: &SyncConfig, db: &Path) -> Result<()> {
    if !db.exists() {
        println!("Database does not exist: {}", db.display());
        return Ok(());
    }

    let store = PriceStore::open(db)?;
    let registry = config.registry()?;
    let statuses = store.status()?;

    println!("Database: {}", db.display());
    println!();
    println!("{:<8} {:<25} {:>8}", "Asset", "Date Range", "Rows");
    println!("{}", "-".repeat(43));

    for entry in registry.iter() {
        match statuses.iter().find(|s| s.asset_id == entry.id) {
            Some(s) => println!(
                "{:<8} {:<25} {:>8}",
                entry.id,
                format!("{} to {}", s.first_date, s.last_date),
                s.rows
            ),
            None => println!("{:<8} {:<25} {:>8}", entry.id, "(no data)", 0),
        }
    }

    Ok(())
}
