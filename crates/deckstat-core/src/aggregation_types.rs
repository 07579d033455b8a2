//! Aggregation data types for deckstat
//!
//! Pure data structures produced by the aggregator and the block
//! reconstructor. These types have no dependencies on pricing or loading.

use crate::types::{DailyDate, SessionId, TokenCounts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Daily usage summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyUsage {
    /// Date of usage
    pub date: DailyDate,
    /// Token counts for the day
    #[serde(flatten)]
    pub tokens: TokenCounts,
    /// Total cost for the day in USD
    #[serde(rename = "cost_usd")]
    pub total_cost: f64,
    /// Sorted, distinct models used during the day
    pub models_used: Vec<String>,
}

/// Session usage summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUsage {
    /// Session identifier
    pub session_id: SessionId,
    /// Project of the first entry seen for this session
    pub project_path: String,
    /// Earliest usage in the session
    pub start_time: DateTime<Utc>,
    /// Latest usage in the session
    pub end_time: DateTime<Utc>,
    /// Token counts for the session
    #[serde(flatten)]
    pub tokens: TokenCounts,
    /// Total cost for the session
    #[serde(rename = "cost_usd")]
    pub total_cost: f64,
    /// Sorted, distinct models used in the session
    pub models_used: Vec<String>,
}

/// Monthly usage summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyUsage {
    /// Year and month in YYYY-MM format
    pub month: String,
    /// Total token counts for the month
    #[serde(flatten)]
    pub tokens: TokenCounts,
    /// Total cost for the month in USD
    #[serde(rename = "cost_usd")]
    pub total_cost: f64,
    /// Sorted, distinct models used in the month
    pub models_used: Vec<String>,
    /// Number of days with usage in this month
    pub active_days: usize,
}

/// A 5-hour session block, or the gap between two of them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBlock {
    /// RFC 3339 rendering of `start_time`, prefixed with `gap-` for gaps
    pub id: String,
    /// First activity in the block (previous block's end for gaps)
    pub start_time: DateTime<Utc>,
    /// Last activity in the block (next activity for gaps)
    pub end_time: DateTime<Utc>,
    /// Total tokens used in this block
    #[serde(flatten)]
    pub tokens: TokenCounts,
    /// Total cost for this block in USD
    #[serde(rename = "cost_usd")]
    pub total_cost: f64,
    /// Sorted, distinct models used in this block
    #[serde(rename = "models")]
    pub models_used: Vec<String>,
    /// Number of entries folded into this block
    pub entry_count: usize,
    /// Whether this is a gap block (period of inactivity)
    #[serde(default)]
    pub is_gap: bool,
    /// Whether this block is currently active
    pub is_active: bool,
}

impl SessionBlock {
    /// Create a synthetic block covering a period of inactivity
    ///
    /// Gap ids carry a `gap-` prefix. A gap starts where the previous block
    /// ends, which is also that block's start when it holds one entry.
    pub fn gap(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id: format!("gap-{}", start_time.to_rfc3339()),
            start_time,
            end_time,
            tokens: TokenCounts::default(),
            total_cost: 0.0,
            models_used: Vec::new(),
            entry_count: 0,
            is_gap: true,
            is_active: false,
        }
    }

    /// Wall-clock span of the block
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

/// Calculate totals from aggregated data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Totals {
    #[serde(flatten)]
    pub tokens: TokenCounts,
    #[serde(rename = "cost_usd")]
    pub total_cost: f64,
}

impl Totals {
    pub fn from_daily(daily_usage: &[DailyUsage]) -> Self {
        let mut totals = Self::default();
        for daily in daily_usage {
            totals.tokens += daily.tokens;
            totals.total_cost += daily.total_cost;
        }
        totals
    }

    pub fn from_sessions(sessions: &[SessionUsage]) -> Self {
        let mut totals = Self::default();
        for session in sessions {
            totals.tokens += session.tokens;
            totals.total_cost += session.total_cost;
        }
        totals
    }

    pub fn from_monthly(monthly_usage: &[MonthlyUsage]) -> Self {
        let mut totals = Self::default();
        for monthly in monthly_usage {
            totals.tokens += monthly.tokens;
            totals.total_cost += monthly.total_cost;
        }
        totals
    }

    /// Gap blocks carry no usage, so they never move the totals
    pub fn from_blocks(blocks: &[SessionBlock]) -> Self {
        let mut totals = Self::default();
        for block in blocks.iter().filter(|b| !b.is_gap) {
            totals.tokens += block.tokens;
            totals.total_cost += block.total_cost;
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_gap_block_is_empty() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
        let gap = SessionBlock::gap(start, end);

        assert!(gap.is_gap);
        assert!(!gap.is_active);
        assert_eq!(gap.entry_count, 0);
        assert_eq!(gap.tokens.total(), 0);
        assert_eq!(gap.total_cost, 0.0);
        assert!(gap.models_used.is_empty());
        assert_eq!(gap.id, format!("gap-{}", start.to_rfc3339()));
        assert_eq!(gap.duration(), chrono::Duration::hours(8));
    }

    #[test]
    fn test_totals_from_daily() {
        let day = |d: u32, input: u64, cost: f64| DailyUsage {
            date: DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap()),
            tokens: TokenCounts::new(input, 0, 0, 0),
            total_cost: cost,
            models_used: vec![],
        };
        let totals = Totals::from_daily(&[day(1, 100, 0.5), day(2, 50, 0.25)]);
        assert_eq!(totals.tokens.input_tokens, 150);
        assert!((totals.total_cost - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_views_serialize_flat_token_fields() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let mut block = SessionBlock::gap(start, start);
        block.id = start.to_rfc3339();
        block.is_gap = false;
        block.tokens = TokenCounts::new(1, 2, 3, 4);
        block.total_cost = 0.5;
        block.models_used = vec!["claude-sonnet-4-20250514".to_string()];

        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["input_tokens"], 1);
        assert_eq!(value["cache_read_tokens"], 4);
        assert_eq!(value["cost_usd"], 0.5);
        assert_eq!(value["models"][0], "claude-sonnet-4-20250514");
        assert!(value.get("tokens").is_none());
        assert!(value.get("total_cost").is_none());

        let back: SessionBlock = serde_json::from_value(value).unwrap();
        assert_eq!(back.tokens, block.tokens);

        let totals = Totals::from_blocks(&[block]);
        let value = serde_json::to_value(&totals).unwrap();
        assert_eq!(value["output_tokens"], 2);
        assert_eq!(value["cost_usd"], 0.5);
    }

    #[test]
    fn test_totals_from_blocks_ignores_gaps() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let mut real = SessionBlock::gap(start, start);
        real.is_gap = false;
        real.tokens = TokenCounts::new(10, 20, 0, 0);
        real.total_cost = 1.0;
        real.entry_count = 1;

        let gap = SessionBlock::gap(start, start + chrono::Duration::hours(6));
        let totals = Totals::from_blocks(&[real, gap]);
        assert_eq!(totals.tokens.total(), 30);
        assert_eq!(totals.total_cost, 1.0);
    }
}
