//! Core domain types for deckstat
//!
//! This module contains the fundamental types used throughout the library.
//! These types provide strong typing for common concepts like model names, session IDs,
//! timestamps, and token counts.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Strongly-typed model name wrapper
///
/// # Examples
/// ```
/// use deckstat_core::types::ModelName;
///
/// let model = ModelName::new("claude-sonnet-4-20250514");
/// assert_eq!(model.as_str(), "claude-sonnet-4-20250514");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelName(String);

impl ModelName {
    /// Create a new ModelName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly-typed session ID wrapper
///
/// Session IDs are opaque grouping keys; no format is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new SessionId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Timestamp of a usage event
///
/// Stored as a UTC instant. Day and month keys are taken directly from the
/// UTC calendar, so no local timezone ever shifts an entry into another
/// bucket.
///
/// # Examples
/// ```
/// use deckstat_core::types::ISOTimestamp;
/// use chrono::{TimeZone, Utc};
///
/// let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
/// let timestamp = ISOTimestamp::new(dt);
///
/// assert_eq!(timestamp.to_daily_date().format("%Y-%m-%d"), "2024-01-15");
/// assert_eq!(timestamp.month_key(), "2024-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ISOTimestamp(DateTime<Utc>);

impl ISOTimestamp {
    /// Create a new ISOTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Truncate to the calendar day
    pub fn to_daily_date(&self) -> DailyDate {
        DailyDate::new(self.0.date_naive())
    }

    /// Year and month in `YYYY-MM` form
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.0.year(), self.0.month())
    }
}

impl AsRef<DateTime<Utc>> for ISOTimestamp {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for ISOTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// Daily date for aggregation
///
/// Serializes as `YYYY-MM-DD`.
///
/// # Examples
/// ```
/// use deckstat_core::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let daily = DailyDate::new(date);
///
/// assert_eq!(daily.format("%Y-%m-%d"), "2024-01-15");
/// assert_eq!(daily.month_key(), "2024-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }

    /// Year and month in `YYYY-MM` form
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.0.year(), self.0.month())
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Token counts for usage tracking
///
/// # Examples
/// ```
/// use deckstat_core::types::TokenCounts;
///
/// let tokens = TokenCounts::new(100, 50, 10, 5);
/// assert_eq!(tokens.total(), 165);
///
/// let combined = tokens + TokenCounts::new(50, 25, 5, 2);
/// assert_eq!(combined.input_tokens, 150);
/// ```
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenCounts {
    /// Input tokens used
    pub input_tokens: u64,
    /// Output tokens generated
    pub output_tokens: u64,
    /// Cache creation tokens
    pub cache_creation_tokens: u64,
    /// Cache read tokens
    pub cache_read_tokens: u64,
}

impl TokenCounts {
    /// Create new TokenCounts
    pub fn new(
        input_tokens: u64,
        output_tokens: u64,
        cache_creation_tokens: u64,
        cache_read_tokens: u64,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            cache_creation_tokens,
            cache_read_tokens,
        }
    }

    /// Calculate total tokens
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens + self.cache_creation_tokens + self.cache_read_tokens
    }

    /// Whether every category is zero
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Add for TokenCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            input_tokens: self.input_tokens + other.input_tokens,
            output_tokens: self.output_tokens + other.output_tokens,
            cache_creation_tokens: self.cache_creation_tokens + other.cache_creation_tokens,
            cache_read_tokens: self.cache_read_tokens + other.cache_read_tokens,
        }
    }
}

impl AddAssign for TokenCounts {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cache_creation_tokens += other.cache_creation_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
    }
}

impl Sum for TokenCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, t| acc + t)
    }
}

/// Cost calculation mode
///
/// Determines how an entry's precomputed `cost_usd` is combined with costs
/// derived from the pricing table. No mode ever fails: a missing price or a
/// missing precomputed cost counts as zero.
///
/// # Examples
/// ```
/// use deckstat_core::types::CostMode;
/// use std::str::FromStr;
///
/// let mode = CostMode::from_str("auto").unwrap();
/// assert_eq!(mode, CostMode::Auto);
/// assert_eq!(CostMode::Calculate.to_string(), "calculate");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostMode {
    /// Use the precomputed cost when present, otherwise calculate
    #[default]
    Auto,
    /// Always calculate from tokens using the pricing table
    Calculate,
    /// Only use precomputed costs; entries without one count as zero
    Display,
}

impl fmt::Display for CostMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Calculate => write!(f, "calculate"),
            Self::Display => write!(f, "display"),
        }
    }
}

impl std::str::FromStr for CostMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "calculate" => Ok(Self::Calculate),
            "display" => Ok(Self::Display),
            _ => Err(format!("Invalid cost mode: {s}")),
        }
    }
}

/// Raw message usage data from a transcript line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageUsage {
    /// Input tokens used
    pub input_tokens: u64,
    /// Output tokens generated
    #[serde(default)]
    pub output_tokens: u64,
    /// Cache creation tokens
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    /// Cache read tokens
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

/// Raw message data from a transcript line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Model used
    #[serde(default)]
    pub model: Option<String>,
    /// Usage data
    pub usage: MessageUsage,
    /// Message ID (used for deduplication)
    #[serde(default)]
    pub id: Option<String>,
}

/// Raw JSONL entry from a Claude Code transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawJsonlEntry {
    /// Session ID
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    /// Timestamp (RFC 3339)
    pub timestamp: String,
    /// Message containing model and usage
    pub message: Message,
    /// Entry type
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    /// Current working directory when the event occurred
    #[serde(default)]
    pub cwd: Option<String>,
    /// Claude Code version number
    #[serde(default)]
    pub version: Option<String>,
    /// Pre-calculated cost in USD (snake_case)
    #[serde(rename = "cost_usd", default)]
    pub cost_usd: Option<f64>,
    /// Pre-calculated cost in USD (camelCase)
    #[serde(rename = "costUSD", default)]
    pub cost_usd_camel: Option<f64>,
    /// Request ID (used for deduplication)
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
    /// Flag indicating if this is an API error message
    #[serde(rename = "isApiErrorMessage", default)]
    pub is_api_error_message: Option<bool>,
}

/// A single usage event
///
/// Immutable once loaded. Consumers that build timelines expect a slice of
/// entries sorted ascending by `timestamp`.
///
/// # Examples
/// ```
/// use deckstat_core::types::{UsageEntry, SessionId, ISOTimestamp, ModelName, TokenCounts};
/// use chrono::Utc;
///
/// let entry = UsageEntry {
///     timestamp: ISOTimestamp::new(Utc::now()),
///     tokens: TokenCounts::new(1000, 500, 0, 0),
///     cost_usd: None,
///     model: Some(ModelName::new("claude-sonnet-4-20250514")),
///     session_id: SessionId::new("session-1"),
///     project_path: "/home/dev/project".to_string(),
///     version: Some("1.0.0".to_string()),
/// };
///
/// let json = serde_json::to_string(&entry).unwrap();
/// assert!(json.contains("\"input_tokens\":1000"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEntry {
    /// When the API call was made
    pub timestamp: ISOTimestamp,
    /// Token counts broken down by category
    #[serde(flatten)]
    pub tokens: TokenCounts,
    /// Precomputed cost in USD, if the transcript recorded one
    pub cost_usd: Option<f64>,
    /// Model used, if known
    pub model: Option<ModelName>,
    /// Session identifier
    pub session_id: SessionId,
    /// Project the session belongs to
    pub project_path: String,
    /// Client version that produced the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl UsageEntry {
    /// Convert a raw transcript line into a usage entry
    ///
    /// `fallback_project` is used when the line carries no `cwd`. Returns
    /// `None` for lines that do not represent billable assistant usage.
    pub fn from_raw(raw: RawJsonlEntry, fallback_project: &str) -> Option<Self> {
        if raw.is_api_error_message.unwrap_or(false) {
            tracing::trace!("Skipping API error message entry");
            return None;
        }

        if let Some(entry_type) = &raw.entry_type {
            if entry_type != "assistant" {
                return None;
            }
        }

        let model = match raw.message.model.as_deref() {
            Some("<synthetic>") => return None,
            Some("") | None => None,
            Some(name) => Some(ModelName::new(name)),
        };

        let timestamp = match DateTime::parse_from_rfc3339(&raw.timestamp) {
            Ok(dt) => ISOTimestamp::new(dt.with_timezone(&Utc)),
            Err(_) => return None,
        };

        let session_id = raw.session_id.unwrap_or_else(|| "unknown".to_string());
        let project_path = raw
            .cwd
            .filter(|cwd| !cwd.is_empty())
            .unwrap_or_else(|| fallback_project.to_string());

        let usage = raw.message.usage;
        Some(Self {
            timestamp,
            tokens: TokenCounts {
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
                cache_creation_tokens: usage.cache_creation_input_tokens,
                cache_read_tokens: usage.cache_read_input_tokens,
            },
            // costUSD is the field Claude Code itself writes
            cost_usd: raw.cost_usd_camel.or(raw.cost_usd),
            model,
            session_id: SessionId::new(session_id),
            project_path,
            version: raw.version,
        })
    }

    /// Generate a deduplication key from message.id and requestId
    pub fn dedup_key(raw: &RawJsonlEntry) -> Option<String> {
        match (&raw.message.id, &raw.request_id) {
            (Some(msg_id), Some(req_id)) => Some(format!("{msg_id}-{req_id}")),
            (Some(msg_id), None) => Some(msg_id.clone()),
            (None, Some(req_id)) => Some(req_id.clone()),
            _ => None,
        }
    }
}
