use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rate_core::AccountId;
use rate_data::PriceEntryLoader;
use rate_db_sqlite::SqliteRepository;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Load nightly prices from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - room_id: id of an existing room
/// - rate_code: rate plan code of that room (e.g., BAR)
/// - occupancy: guest count
/// - start_date, end_date: inclusive dates as YYYY-MM-DD
/// - price: nightly price (e.g., 150.00)
///
/// Existing prices of every calendar row present in the file are replaced.
#[derive(Parser, Debug)]
#[command(name = "rate-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing price data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database path or URL (created if missing)
    #[arg(short, long, default_value = "rates.db")]
    database: String,

    /// Account the prices belong to
    #[arg(short, long, default_value_t = 1)]
    account: i64,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        info!("running migrations");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
    }

    if let Some(seeds_dir) = &args.seeds {
        info!(seeds_dir = %seeds_dir.display(), "running seeds");
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
    }

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = PriceEntryLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    info!(file = %args.file.display(), records = records.len(), "parsed price records");

    let inserted = PriceEntryLoader::load(&repo, AccountId(args.account), &records)
        .await
        .context("Failed to load prices into database")?;

    println!(
        "Successfully loaded {} price entries for account {}.",
        inserted, args.account
    );

    Ok(())
}
