//! CLI subcommand implementations.

pub mod calendar;
pub mod export;
pub mod log;
pub mod sessions;
pub mod status;
pub mod timer;
pub mod trend;
