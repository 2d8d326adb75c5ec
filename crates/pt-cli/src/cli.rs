//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pt_core::{DayKey, Month};

/// Persistent stopwatch with a daily log.
///
/// Elapsed time survives restarts: a timer left running keeps counting while
/// nothing observes it, and tracked time is attributed to local calendar days.
#[derive(Debug, Parser)]
#[command(name = "pt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the timer.
    Start,

    /// Pause the timer, recording the run.
    Pause,

    /// Zero the timer. A running run is recorded first.
    Reset,

    /// Show elapsed time and today's total.
    Status {
        /// Keep refreshing the elapsed time once per second.
        #[arg(long, conflicts_with = "json")]
        watch: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the sessions recorded on a day.
    Sessions {
        /// Day to list (YYYY-MM-DD), default today.
        #[arg(long)]
        date: Option<DayKey>,
    },

    /// Read or write the daily log.
    #[command(subcommand)]
    Log(LogAction),

    /// Show a month of tracked time as a heat-map.
    Calendar {
        /// Month to show (YYYY-MM), default the current month.
        #[arg(long)]
        month: Option<Month>,
    },

    /// Chart tracked time over recent days.
    Trend {
        /// Window length in days, including today.
        #[arg(long)]
        days: Option<u32>,
    },

    /// Export daily totals and log entries as CSV.
    Export {
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Daily log operations.
#[derive(Debug, Subcommand)]
pub enum LogAction {
    /// Print the note for a day.
    Show {
        /// Day (YYYY-MM-DD), default today.
        #[arg(long)]
        date: Option<DayKey>,
    },

    /// Replace the note for a day. An empty note removes it.
    Set {
        /// Day (YYYY-MM-DD), default today.
        #[arg(long)]
        date: Option<DayKey>,

        /// The note text.
        text: String,
    },

    /// Append lines from stdin to a day's note, saving once input settles.
    Edit {
        /// Day (YYYY-MM-DD), default today.
        #[arg(long)]
        date: Option<DayKey>,
    },
}
