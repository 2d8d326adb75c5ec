use std::io::{self, BufReader};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use pt_core::{DayKey, Month, Tracker};
use pt_db::Database;
use tracing_subscriber::EnvFilter;

use pt_cli::commands::{calendar, export, log, sessions, status, timer, trend};
use pt_cli::{Cli, Commands, Config, LogAction};

/// Load config, open the database and reconcile any run left open.
fn open_tracker(config_path: Option<&Path>) -> Result<(Tracker<Database, Local>, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path).context("failed to open database")?;
    let mut tracker = Tracker::load(db, Local).context("failed to load timer state")?;
    tracker.on_sessions_changed(|sessions| {
        tracing::debug!(count = sessions.len(), "session collection updated");
    });
    tracker
        .reconcile(Local::now().timestamp_millis())
        .context("failed to reconcile timer state")?;
    Ok((tracker, config))
}

fn today() -> DayKey {
    DayKey::new(Local::now().date_naive())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut tracker, config) = open_tracker(cli.config.as_deref())?;
    let mut out = io::stdout().lock();

    match command {
        Commands::Start => timer::run(&mut out, &mut tracker, timer::Action::Start, &Local::now())?,
        Commands::Pause => timer::run(&mut out, &mut tracker, timer::Action::Pause, &Local::now())?,
        Commands::Reset => timer::run(&mut out, &mut tracker, timer::Action::Reset, &Local::now())?,
        Commands::Status { watch, json } => {
            if *watch {
                status::watch(&mut out, &tracker, Local::now, Duration::from_secs(1), None)?;
            } else {
                status::run(&mut out, &tracker, &Local::now(), *json)?;
            }
        }
        Commands::Sessions { date } => {
            sessions::run(&mut out, &tracker, date.unwrap_or_else(today))?;
        }
        Commands::Log(action) => match action {
            LogAction::Show { date } => log::show(&mut out, &tracker, date.unwrap_or_else(today))?,
            LogAction::Set { date, text } => {
                log::set(&mut out, &mut tracker, date.unwrap_or_else(today), text)?;
            }
            LogAction::Edit { date } => {
                let stdin = BufReader::new(io::stdin());
                let day = date.unwrap_or_else(today);
                let saves = log::edit(stdin, &mut out, &mut tracker, day, config.log_debounce_ms)?;
                tracing::debug!(saves, %day, "log edit finished");
            }
        },
        Commands::Calendar { month } => {
            let month = month.unwrap_or_else(|| {
                let now = Local::now();
                Month {
                    year: now.year(),
                    month: now.month(),
                }
            });
            calendar::run(&mut out, month, &tracker.daily_totals()?)?;
        }
        Commands::Trend { days } => {
            let days = days.unwrap_or(config.trend_days);
            trend::run(&mut out, &tracker.daily_totals()?, today().date(), days)?;
        }
        Commands::Export { output } => {
            export::run(&mut out, &tracker, output.as_deref())?;
        }
    }

    Ok(())
}
