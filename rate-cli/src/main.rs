use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use rate_cli::config::{Overrides, Settings};
use rate_cli::{app, export, logging, render};
use rate_core::calendar::YearMonth;
use rate_core::{RateKey, RoomId};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Hotel rate calendar.
///
/// Shows a month of resolved nightly prices per room, rate plan and guest
/// count, and records new prices for a date range.
#[derive(Debug, Parser)]
#[command(name = "kolibri-rates", version)]
struct Cli {
    /// TOML settings file. Defaults to `./kolibri-rates.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `rates.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Account whose calendar is shown and edited.
    #[arg(long, global = true)]
    account: Option<i64>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log level or `EnvFilter` directive (e.g. `debug`, `rate_core=trace`).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Suppress console log output. File logging is unaffected.
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the rate grid for one month.
    Show {
        /// Month as `YYYY-MM`. Defaults to the current month.
        #[arg(long)]
        month: Option<YearMonth>,
    },

    /// Set the price of one calendar row for an inclusive date range.
    SetPrice {
        #[arg(long)]
        room: i64,

        /// Rate plan code, e.g. `BAR`.
        #[arg(long)]
        rate: String,

        #[arg(long)]
        occupancy: u32,

        /// First night, `YYYY-MM-DD`.
        #[arg(long)]
        from: NaiveDate,

        /// Last night, `YYYY-MM-DD`. Defaults to `--from`.
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Nightly price, e.g. `150.00`.
        #[arg(long)]
        price: String,
    },

    /// Delete one stored price by id (see `show`).
    ClearPrice {
        #[arg(long)]
        id: i64,
    },

    /// Write the resolved daily prices of one month as CSV.
    Export {
        /// Month as `YYYY-MM`. Defaults to the current month.
        #[arg(long)]
        month: Option<YearMonth>,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.backend.clone(),
            connection_string: self.db.clone(),
            account: self.account,
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

fn current_month() -> YearMonth {
    YearMonth::of(Local::now().date_naive())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_overrides(cli.overrides());

    logging::init_logging(&settings.logging.level);
    // An explicit flag also beats RUST_LOG.
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if cli.quiet {
        logging::set_console_enabled(false)?;
    }
    if let Some(path) = &settings.logging.file {
        logging::enable_file_logging(path)?;
    }

    let db_config = settings.db_config();
    let account_id = settings.account_id();

    debug!("connecting to {} backend", db_config.backend);
    let registry = app::build_registry();
    let repo = registry
        .create(&db_config)
        .await
        .with_context(|| format!("Failed to open database '{}'", db_config.connection_string))?;

    match cli.command {
        Command::Show { month } => {
            let month = month.unwrap_or_else(current_month);
            let calendar = app::load_calendar(&*repo, account_id, month).await?;
            let mut stdout = io::stdout().lock();
            render::render_calendar(&calendar, &mut stdout)?;
        }
        Command::SetPrice {
            room,
            rate,
            occupancy,
            from,
            to,
            price,
        } => {
            let to = to.unwrap_or(from);
            let key = RateKey::new(RoomId(room), rate.trim(), occupancy);
            let mut calendar = app::load_calendar(&*repo, account_id, YearMonth::of(from)).await?;

            let entry = app::set_price(&*repo, &mut calendar, &key, from, to, &price)
                .await
                .with_context(|| format!("Failed to set price for {key}"))?;

            println!(
                "Saved price {} for {} on {} (id {})",
                render::format_price(entry.price),
                key,
                entry.range,
                entry.id
            );
            let mut stdout = io::stdout().lock();
            writeln!(stdout)?;
            render::render_calendar(&calendar, &mut stdout)?;
        }
        Command::ClearPrice { id } => {
            let mut calendar = app::load_calendar(&*repo, account_id, current_month()).await?;
            app::clear_price(&*repo, &mut calendar, id)
                .await
                .with_context(|| format!("Failed to remove price {id}"))?;
            println!("Removed price {id}");
        }
        Command::Export { month, out } => {
            let month = month.unwrap_or_else(current_month);
            let calendar = app::load_calendar(&*repo, account_id, month).await?;

            let written = match &out {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Failed to create '{}'", path.display()))?;
                    export::write_csv(&calendar, BufWriter::new(file))?
                }
                None => export::write_csv(&calendar, io::stdout().lock())?,
            };
            info!(%month, records = written, "export finished");
        }
    }

    Ok(())
}
