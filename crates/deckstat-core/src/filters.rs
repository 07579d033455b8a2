//! Filtering for usage entries and aggregated views
//!
//! Supports inclusive date ranges and month ranges. Query strings
//! coming from the CLI or HTTP layer are parsed with [`parse_date_filter`] and
//! [`parse_month_filter`], which reject malformed input with
//! [`DeckstatError::InvalidDate`].
//!
//! # Examples
//!
//! ```
//! use deckstat_core::filters::UsageFilter;
//! use chrono::NaiveDate;
//!
//! let filter = UsageFilter::new()
//!     .with_since(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
//!     .with_until(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
//! assert!(filter.matches_date(&NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
//! assert!(!filter.matches_date(&NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
//! ```

use crate::error::{DeckstatError, Result};
use chrono::NaiveDate;

/// Inclusive date bounds for daily views
///
/// Both bounds are optional.
#[derive(Debug, Default, Clone)]
pub struct UsageFilter {
    /// Start date filter (inclusive)
    pub since_date: Option<NaiveDate>,
    /// End date filter (inclusive)
    pub until_date: Option<NaiveDate>,
}

impl UsageFilter {
    /// Create a new filter with no restrictions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start date filter
    pub fn with_since(mut self, date: NaiveDate) -> Self {
        self.since_date = Some(date);
        self
    }

    /// Set the end date filter
    pub fn with_until(mut self, date: NaiveDate) -> Self {
        self.until_date = Some(date);
        self
    }

    /// Check a calendar date against the bounds
    pub fn matches_date(&self, date: &NaiveDate) -> bool {
        if let Some(since) = &self.since_date {
            if date < since {
                return false;
            }
        }

        if let Some(until) = &self.until_date {
            if date > until {
                return false;
            }
        }

        true
    }
}

/// Month filter for monthly aggregation
///
/// # Example
///
/// ```
/// use deckstat_core::filters::MonthFilter;
///
/// // Filter for Q1 2024
/// let filter = MonthFilter::new()
///     .with_since(2024, 1)
///     .with_until(2024, 3);
/// assert!(filter.matches_month_key("2024-02"));
/// assert!(!filter.matches_month_key("2024-04"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MonthFilter {
    /// Start month (year and month)
    pub since: Option<(i32, u32)>,
    /// End month (year and month)
    pub until: Option<(i32, u32)>,
}

impl MonthFilter {
    /// Create a new month filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start month
    pub fn with_since(mut self, year: i32, month: u32) -> Self {
        self.since = Some((year, month));
        self
    }

    /// Set the end month
    pub fn with_until(mut self, year: i32, month: u32) -> Self {
        self.until = Some((year, month));
        self
    }

    /// Check a `YYYY-MM` key; unparseable keys never match
    pub fn matches_month_key(&self, key: &str) -> bool {
        match parse_year_month(key) {
            Some((year, month)) => self.matches_year_month(year, month),
            None => false,
        }
    }

    fn matches_year_month(&self, year: i32, month: u32) -> bool {
        if let Some(since) = self.since {
            if (year, month) < since {
                return false;
            }
        }

        if let Some(until) = self.until {
            if (year, month) > until {
                return false;
            }
        }

        true
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| DeckstatError::InvalidDate(format!("{date_str} (expected YYYY-MM-DD)")))
}

/// Parse a `YYYY-MM` month into `(year, month)`
pub fn parse_month_filter(month_str: &str) -> Result<(i32, u32)> {
    parse_year_month(month_str)
        .ok_or_else(|| DeckstatError::InvalidDate(format!("{month_str} (expected YYYY-MM)")))
}

fn parse_year_month(s: &str) -> Option<(i32, u32)> {
    let (year, month) = s.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}
