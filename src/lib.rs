//! deckstat - Usage and cost analytics for Claude Code transcripts
//!
//! This library provides:
//! - Loading and deduplicating JSONL transcripts from `~/.claude/projects`
//! - Daily, session and monthly aggregation with cost calculation
//! - Reconstruction of 5-hour session blocks, including gaps
//! - A cached [`service::UsageService`] and the HTTP API on top of it
//!
//! Pricing lives in `deckstat-pricing`; shared types and errors live in
//! `deckstat-core`.
//!
//! # Examples
//!
//! ```no_run
//! use deckstat::{data_loader::DataLoader, service::UsageService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> deckstat_core::Result<()> {
//!     let loader = DataLoader::discover()?;
//!     let service = UsageService::new(Arc::new(loader));
//!
//!     let daily = service.get_daily_usage(None, Some("2024-01-01"), None).await?;
//!     println!("{} days, ${:.2}", daily.daily.len(), daily.totals.total_cost);
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod blocks;
pub mod cli;
pub mod config;
pub mod data_loader;
pub mod model_formatter;
pub mod output;
pub mod server;
pub mod service;

pub use deckstat_core::{DeckstatError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
