//! CLI interface for intraday-sync
//!
//! Provides subcommands for:
//! - `run`: Start the live synchronization engine
//! - `fetch`: One-shot historical backfill for today's window
//! - `config`: Show effective configuration

mod fetch;
mod run;

pub use fetch::FetchArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "intraday-sync")]
#[command(about = "Intraday live-market-data synchronization engine")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the live synchronization engine
    Run(RunArgs),
    /// One-shot historical backfill for today's session window
    Fetch(FetchArgs),
    /// Show effective configuration
    Config,
}
