//! Core types, filters, and error handling for deckstat
//!
//! This crate provides the domain types shared by the pricing crate and the
//! service binary: usage entries, token counts, aggregated views and the
//! session block timeline.

pub mod aggregation_types;
pub mod error;
pub mod filters;
pub mod types;

// Re-export commonly used types
pub use aggregation_types::{DailyUsage, MonthlyUsage, SessionBlock, SessionUsage, Totals};
pub use error::{DeckstatError, Result};
pub use types::{CostMode, DailyDate, ISOTimestamp, ModelName, SessionId, TokenCounts, UsageEntry};
