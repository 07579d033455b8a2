//! Error types for deckstat
//!
//! The analytics core itself never fails: unknown models cost nothing and
//! empty inputs produce empty outputs. Errors only arise at the edges, when
//! loading transcripts from disk, validating query parameters or binding the
//! HTTP listener.
//!
//! # Example
//!
//! ```
//! use deckstat_core::error::{DeckstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to DeckstatError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for deckstat operations
#[derive(Error, Debug)]
pub enum DeckstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No usage data directory could be found
    #[error("No Claude data directory found")]
    NoDataDirectory,

    /// Invalid date or month format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),
}

impl DeckstatError {
    /// Whether the error was caused by bad caller input rather than a failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidDate(_) | Self::InvalidArgument(_))
    }
}

/// Convenience type alias for Results in deckstat
pub type Result<T> = std::result::Result<T, DeckstatError>;
