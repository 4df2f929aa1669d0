//! CLI interface for gia-vang
//!
//! Provides subcommands for:
//! - `check`: Fetch all sources and report price moves
//! - `record`: Record a quote by hand
//! - `show`: Show cached prices
//! - `config`: Show configuration

mod check;
mod record;
mod show;

pub use check::CheckArgs;
pub use record::RecordArgs;
pub use show::ShowArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gia-vang")]
#[command(about = "Gold price snapshot cache and change notifier for Vietnamese gold vendors")]
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
    /// Fetch all sources and report price moves
    Check(CheckArgs),
    /// Record a quote by hand
    Record(RecordArgs),
    /// Show cached prices
    Show(ShowArgs),
    /// Show configuration
    Config,
}
