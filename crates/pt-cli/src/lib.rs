//! Persistent timer CLI library.
//!
//! This crate provides the CLI interface for the persistent timer.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, LogAction};
pub use config::Config;
