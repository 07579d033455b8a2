//! Command-line interface for deckstat
//!
//! `deckstat serve` runs the HTTP API; the report commands print the same
//! views to the terminal.
//!
//! # Example
//!
//! ```bash
//! # Daily usage for January 2024
//! deckstat daily --since 2024-01-01 --until 2024-01-31
//!
//! # The current session block as JSON
//! deckstat blocks --active --json
//!
//! # Serve the API for a dashboard on another origin
//! deckstat serve --port 8080 --cors-origin http://localhost:3000
//! ```

use crate::config::ServeArgs;
use clap::{Parser, Subcommand};
use deckstat_core::types::CostMode;
use std::path::PathBuf;

/// Usage and cost analytics for Claude Code transcripts
#[derive(Parser, Debug, Clone)]
#[command(name = "deckstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Only show warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Cost calculation mode (auto, calculate, display)
    #[arg(long, default_value = "auto", global = true)]
    pub mode: CostMode,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Only include entries whose project path matches exactly
    #[arg(long, short = 'p', global = true)]
    pub project: Option<String>,

    /// Directory containing Claude Code project transcripts
    #[arg(long, env = "CLAUDE_DATA_PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Show full model names instead of shortened versions
    #[arg(long, global = true)]
    pub full_model_names: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Overall usage statistics
    Summary,

    /// Usage grouped by day
    Daily {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
    },

    /// Usage grouped by session, most recent first
    Session {
        /// Maximum number of sessions to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Usage grouped by month
    Monthly {
        /// First month to include (YYYY-MM)
        #[arg(long)]
        since: Option<String>,

        /// Last month to include (YYYY-MM)
        #[arg(long)]
        until: Option<String>,
    },

    /// 5-hour session blocks
    Blocks {
        /// Only show the active block
        #[arg(long)]
        active: bool,

        /// Show every block instead of the last few days
        #[arg(long)]
        all: bool,
    },

    /// Models with built-in pricing
    Models,
}
