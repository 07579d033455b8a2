//! Session block reconstruction
//!
//! Rebuilds the timeline of 5-hour billing blocks from a sorted snapshot of
//! usage entries. A block stays open while consecutive entries are less than
//! [`SESSION_DURATION`] apart; a longer silence closes it and is represented
//! by a synthetic gap block so the timeline has no holes.
//!
//! Blocks are recomputed on every call. `now` is passed in so activity
//! detection is deterministic under test.

use chrono::{DateTime, Duration, Timelike, Utc};
use deckstat_core::aggregation_types::SessionBlock;
use deckstat_core::types::{CostMode, TokenCounts, UsageEntry};
use deckstat_pricing::CostCalculator;
use std::collections::BTreeSet;
use tracing::debug;

/// Inactivity threshold that closes a block, and the freshness window that
/// keeps the latest block active
pub const SESSION_DURATION: Duration = Duration::hours(5);

/// Default look-back used by [`filter_recent_blocks`] callers
pub const RECENT_BLOCK_DAYS: i64 = 3;

/// Block being filled while walking the entries
struct OpenBlock {
    start_time: DateTime<Utc>,
    last_entry_time: DateTime<Utc>,
    tokens: TokenCounts,
    cost: f64,
    models: BTreeSet<String>,
    entry_count: usize,
}

impl OpenBlock {
    fn start(entry: &UsageEntry, cost: f64) -> Self {
        let timestamp = *entry.timestamp.inner();
        let mut block = Self {
            start_time: timestamp,
            last_entry_time: timestamp,
            tokens: TokenCounts::default(),
            cost: 0.0,
            models: BTreeSet::new(),
            entry_count: 0,
        };
        block.fold(entry, cost);
        block
    }

    fn fold(&mut self, entry: &UsageEntry, cost: f64) {
        self.last_entry_time = *entry.timestamp.inner();
        self.tokens += entry.tokens;
        self.cost += cost;
        self.entry_count += 1;
        if let Some(model) = &entry.model {
            self.models.insert(model.to_string());
        }
    }

    fn close(self) -> SessionBlock {
        SessionBlock {
            id: self.start_time.to_rfc3339(),
            start_time: self.start_time,
            end_time: self.last_entry_time,
            tokens: self.tokens,
            total_cost: self.cost,
            models_used: self.models.into_iter().collect(),
            entry_count: self.entry_count,
            is_gap: false,
            is_active: false,
        }
    }
}

/// Reconstruct session blocks from entries sorted ascending by timestamp
///
/// Output is chronological. Between two real blocks separated by a silence
/// of at least [`SESSION_DURATION`] sits a gap block spanning from the end of
/// the first to the start of the second. Only the last real block can be
/// active, and only while `now` is within [`SESSION_DURATION`] of its last
/// entry.
///
/// The input order is trusted; unsorted input produces unspecified blocks.
pub fn identify_session_blocks(
    entries: &[UsageEntry],
    now: DateTime<Utc>,
    cost_mode: CostMode,
) -> Vec<SessionBlock> {
    identify_session_blocks_with(entries, now, cost_mode, &CostCalculator::new())
}

/// [`identify_session_blocks`] with an explicit cost calculator
pub fn identify_session_blocks_with(
    entries: &[UsageEntry],
    now: DateTime<Utc>,
    cost_mode: CostMode,
    calculator: &CostCalculator,
) -> Vec<SessionBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<OpenBlock> = None;

    for entry in entries {
        let cost = calculator.cost_for_entry(entry, cost_mode);
        let entry_time = *entry.timestamp.inner();

        current = Some(match current.take() {
            None => OpenBlock::start(entry, cost),
            Some(mut open) if entry_time - open.last_entry_time < SESSION_DURATION => {
                open.fold(entry, cost);
                open
            }
            Some(open) => {
                let closed = open.close();
                let gap = SessionBlock::gap(closed.end_time, entry_time);
                blocks.push(closed);
                blocks.push(gap);
                OpenBlock::start(entry, cost)
            }
        });
    }

    if let Some(open) = current {
        let mut last = open.close();
        last.is_active = now - last.end_time < SESSION_DURATION;
        blocks.push(last);
    }

    debug!(
        "Reconstructed {} blocks from {} entries",
        blocks.len(),
        entries.len()
    );

    blocks
}

/// Keep active blocks and blocks starting within the last `days` days
pub fn filter_recent_blocks(
    blocks: Vec<SessionBlock>,
    days: i64,
    now: DateTime<Utc>,
) -> Vec<SessionBlock> {
    let cutoff = now - Duration::days(days);
    blocks
        .into_iter()
        .filter(|b| b.is_active || b.start_time >= cutoff)
        .collect()
}

/// Truncate a timestamp to the hour boundary (XX:00:00)
pub fn floor_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}
