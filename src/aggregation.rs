//! Aggregation module for summarizing usage data
//!
//! Groups a snapshot of [`UsageEntry`] values by day, session or month,
//! summing tokens and cost and collecting the distinct models seen in each
//! bucket.
//!
//! Entries are taken by reference; only the bucket keys and model names are
//! cloned into the accumulators. Bucket order in the input does not matter.
//! Daily and monthly output is sorted by key descending, sessions by last
//! activity descending.
//!
//! # Example
//!
//! ```
//! use deckstat::aggregation::Aggregator;
//! use deckstat_core::types::{
//!     CostMode, ISOTimestamp, ModelName, SessionId, TokenCounts, UsageEntry,
//! };
//! use chrono::{TimeZone, Utc};
//!
//! let entry = UsageEntry {
//!     timestamp: ISOTimestamp::new(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()),
//!     tokens: TokenCounts::new(1000, 500, 0, 0),
//!     cost_usd: None,
//!     model: Some(ModelName::new("claude-sonnet-4-20250514")),
//!     session_id: SessionId::new("session-1"),
//!     project_path: "project-a".to_string(),
//!     version: None,
//! };
//!
//! let aggregator = Aggregator::new(CostMode::Auto);
//! let daily = aggregator.aggregate_by_daily(&[entry]);
//! assert_eq!(daily.len(), 1);
//! assert_eq!(daily[0].date.to_string(), "2024-01-15");
//! ```

use chrono::{DateTime, Utc};
use deckstat_core::aggregation_types::{DailyUsage, MonthlyUsage, SessionUsage};
use deckstat_core::types::{CostMode, DailyDate, SessionId, TokenCounts, UsageEntry};
use deckstat_pricing::CostCalculator;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Running totals shared by every bucket kind
#[derive(Default)]
struct BucketAccumulator {
    tokens: TokenCounts,
    cost: f64,
    models: BTreeSet<String>,
}

impl BucketAccumulator {
    fn add_entry(&mut self, entry: &UsageEntry, calculated_cost: f64) {
        self.tokens += entry.tokens;
        self.cost += calculated_cost;
        if let Some(model) = &entry.model {
            if !self.models.contains(model.as_str()) {
                self.models.insert(model.to_string());
            }
        }
    }

    fn models_used(self) -> Vec<String> {
        self.models.into_iter().collect()
    }
}

/// Accumulator for session aggregation
struct SessionAccumulator {
    project_path: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    bucket: BucketAccumulator,
}

impl SessionAccumulator {
    fn new(entry: &UsageEntry) -> Self {
        let timestamp = *entry.timestamp.inner();
        Self {
            project_path: entry.project_path.clone(),
            start_time: timestamp,
            end_time: timestamp,
            bucket: BucketAccumulator::default(),
        }
    }

    fn add_entry(&mut self, entry: &UsageEntry, calculated_cost: f64) {
        let timestamp = *entry.timestamp.inner();
        self.start_time = self.start_time.min(timestamp);
        self.end_time = self.end_time.max(timestamp);
        self.bucket.add_entry(entry, calculated_cost);
    }

    fn into_session_usage(self, session_id: SessionId) -> SessionUsage {
        SessionUsage {
            session_id,
            project_path: self.project_path,
            start_time: self.start_time,
            end_time: self.end_time,
            tokens: self.bucket.tokens,
            total_cost: self.bucket.cost,
            models_used: self.bucket.models_used(),
        }
    }
}

/// Accumulator for monthly aggregation
#[derive(Default)]
struct MonthlyAccumulator {
    days: HashSet<DailyDate>,
    bucket: BucketAccumulator,
}

/// Main aggregation engine
///
/// Pure and synchronous; holds no state besides the cost mode, so one
/// instance can be shared freely between callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    cost_calculator: CostCalculator,
    cost_mode: CostMode,
}

impl Aggregator {
    /// Create a new Aggregator using the global pricing table
    pub fn new(cost_mode: CostMode) -> Self {
        Self {
            cost_calculator: CostCalculator::new(),
            cost_mode,
        }
    }

    /// Use a specific calculator (for custom pricing tables)
    pub fn with_calculator(mut self, cost_calculator: CostCalculator) -> Self {
        self.cost_calculator = cost_calculator;
        self
    }

    pub fn cost_mode(&self) -> CostMode {
        self.cost_mode
    }

    fn entry_cost(&self, entry: &UsageEntry) -> f64 {
        self.cost_calculator.cost_for_entry(entry, self.cost_mode)
    }

    /// Aggregate entries by UTC calendar day, most recent day first
    pub fn aggregate_by_daily(&self, entries: &[UsageEntry]) -> Vec<DailyUsage> {
        let mut daily_map: BTreeMap<DailyDate, BucketAccumulator> = BTreeMap::new();

        for entry in entries {
            let cost = self.entry_cost(entry);
            daily_map
                .entry(entry.timestamp.to_daily_date())
                .or_default()
                .add_entry(entry, cost);
        }

        debug!("Aggregated {} entries into {} days", entries.len(), daily_map.len());

        daily_map
            .into_iter()
            .rev()
            .map(|(date, acc)| DailyUsage {
                date,
                tokens: acc.tokens,
                total_cost: acc.cost,
                models_used: acc.models_used(),
            })
            .collect()
    }

    /// Aggregate entries by session, most recently active session first
    ///
    /// Each session keeps the project path of the first entry seen for it.
    pub fn aggregate_by_session(&self, entries: &[UsageEntry]) -> Vec<SessionUsage> {
        let mut sessions: HashMap<SessionId, SessionAccumulator> = HashMap::new();

        for entry in entries {
            let cost = self.entry_cost(entry);
            sessions
                .entry(entry.session_id.clone())
                .or_insert_with(|| SessionAccumulator::new(entry))
                .add_entry(entry, cost);
        }

        debug!(
            "Aggregated {} entries into {} sessions",
            entries.len(),
            sessions.len()
        );

        let mut result: Vec<SessionUsage> = sessions
            .into_iter()
            .map(|(id, acc)| acc.into_session_usage(id))
            .collect();
        result.sort_by(|a, b| {
            (b.end_time, &b.session_id).cmp(&(a.end_time, &a.session_id))
        });
        result
    }

    /// Aggregate entries by `YYYY-MM`, most recent month first
    pub fn aggregate_by_monthly(&self, entries: &[UsageEntry]) -> Vec<MonthlyUsage> {
        let mut monthly_map: BTreeMap<String, MonthlyAccumulator> = BTreeMap::new();

        for entry in entries {
            let cost = self.entry_cost(entry);
            let acc = monthly_map.entry(entry.timestamp.month_key()).or_default();
            acc.days.insert(entry.timestamp.to_daily_date());
            acc.bucket.add_entry(entry, cost);
        }

        monthly_map
            .into_iter()
            .rev()
            .map(|(month, acc)| MonthlyUsage {
                month,
                tokens: acc.bucket.tokens,
                total_cost: acc.bucket.cost,
                active_days: acc.days.len(),
                models_used: acc.bucket.models_used(),
            })
            .collect()
    }
}
