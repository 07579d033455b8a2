//! Cached read-only usage views
//!
//! [`UsageService`] sits between a [`UsageSource`] and the HTTP/CLI front
//! ends. It loads a snapshot, runs the aggregator or the block reconstructor,
//! and caches the resulting view per `(kind, project)` for a configurable
//! TTL. Query-specific filtering (date ranges, limits, recent/active) runs on
//! the cached view, so one cached computation serves every filter variant.
//!
//! Block activity depends on the current time, which is why cached views
//! expire instead of living until explicit invalidation.

use crate::aggregation::Aggregator;
use crate::blocks::{RECENT_BLOCK_DAYS, filter_recent_blocks, identify_session_blocks_with};
use crate::data_loader::UsageSource;
use chrono::{DateTime, Utc};
use deckstat_core::aggregation_types::{
    DailyUsage, MonthlyUsage, SessionBlock, SessionUsage, Totals,
};
use deckstat_core::error::{DeckstatError, Result};
use deckstat_core::filters::{MonthFilter, UsageFilter, parse_date_filter, parse_month_filter};
use deckstat_core::types::{CostMode, TokenCounts, UsageEntry};
use deckstat_pricing::CostCalculator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Default number of sessions returned
pub const DEFAULT_SESSION_LIMIT: usize = 50;
/// Largest accepted session limit
pub const MAX_SESSION_LIMIT: usize = 500;
/// Default lifetime of a cached view
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Which cached view an operation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Summary,
    Daily,
    Session,
    Monthly,
    Block,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Summary => "summary",
            Self::Daily => "daily",
            Self::Session => "session",
            Self::Monthly => "monthly",
            Self::Block => "block",
        };
        write!(f, "{name}")
    }
}

impl FromStr for CacheKind {
    type Err = DeckstatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "daily" => Ok(Self::Daily),
            "session" | "sessions" => Ok(Self::Session),
            "monthly" => Ok(Self::Monthly),
            "block" | "blocks" => Ok(Self::Block),
            _ => Err(DeckstatError::InvalidArgument(format!(
                "unknown cache type: {s} (expected daily, session, monthly, block or summary)"
            ))),
        }
    }
}

/// Overall usage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageSummary {
    #[serde(flatten)]
    pub tokens: TokenCounts,
    #[serde(rename = "cost_usd")]
    pub total_cost: f64,
    pub entry_count: usize,
    pub session_count: usize,
    pub project_count: usize,
    pub models_used: Vec<String>,
    pub first_activity: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyUsageList {
    pub daily: Vec<DailyUsage>,
    pub totals: Totals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUsageList {
    pub sessions: Vec<SessionUsage>,
    pub totals: Totals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyUsageList {
    pub monthly: Vec<MonthlyUsage>,
    pub totals: Totals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockUsageList {
    pub blocks: Vec<SessionBlock>,
    pub totals: Totals,
}

#[derive(Debug, Clone)]
enum CachedView {
    Summary(UsageSummary),
    Daily(Vec<DailyUsage>),
    Session(Vec<SessionUsage>),
    Monthly(Vec<MonthlyUsage>),
    Block(Vec<SessionBlock>),
}

struct CacheSlot {
    stored_at: Instant,
    view: CachedView,
}

type CacheKey = (CacheKind, Option<String>);

/// Usage analytics over a [`UsageSource`] with a per-view TTL cache
pub struct UsageService {
    source: Arc<dyn UsageSource>,
    clock: Arc<dyn Clock>,
    aggregator: Aggregator,
    calculator: CostCalculator,
    cache: RwLock<HashMap<CacheKey, CacheSlot>>,
    cache_ttl: Duration,
}

impl UsageService {
    /// Service over `source` using the system clock and `CostMode::Auto`
    pub fn new(source: Arc<dyn UsageSource>) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            aggregator: Aggregator::default(),
            calculator: CostCalculator::new(),
            cache: RwLock::new(HashMap::new()),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Replace the clock (tests pin `now` with this)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set how long computed views are reused; zero disables caching
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set how entry costs are derived
    pub fn with_cost_mode(mut self, mode: CostMode) -> Self {
        self.aggregator = Aggregator::new(mode).with_calculator(self.calculator);
        self
    }

    /// Overall usage statistics
    pub async fn get_usage_summary(&self, project: Option<&str>) -> Result<UsageSummary> {
        self.cached(CacheKind::Summary, project, |v| match v {
            CachedView::Summary(s) => Some(s.clone()),
            _ => None,
        })
        .await
    }

    /// Daily breakdown, optionally bounded by inclusive `YYYY-MM-DD` dates
    pub async fn get_daily_usage(
        &self,
        project: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<DailyUsageList> {
        let mut filter = UsageFilter::new();
        if let Some(start) = start_date {
            filter = filter.with_since(parse_date_filter(start)?);
        }
        if let Some(end) = end_date {
            filter = filter.with_until(parse_date_filter(end)?);
        }

        let mut daily = self
            .cached(CacheKind::Daily, project, |v| match v {
                CachedView::Daily(d) => Some(d.clone()),
                _ => None,
            })
            .await?;
        daily.retain(|d| filter.matches_date(d.date.inner()));

        let totals = Totals::from_daily(&daily);
        Ok(DailyUsageList { daily, totals })
    }

    /// Most recently active sessions, at most `limit` (default 50, max 500)
    pub async fn get_session_usage(
        &self,
        project: Option<&str>,
        limit: Option<usize>,
    ) -> Result<SessionUsageList> {
        let limit = limit.unwrap_or(DEFAULT_SESSION_LIMIT);
        if !(1..=MAX_SESSION_LIMIT).contains(&limit) {
            return Err(DeckstatError::InvalidArgument(format!(
                "limit must be between 1 and {MAX_SESSION_LIMIT}, got {limit}"
            )));
        }

        let mut sessions = self
            .cached(CacheKind::Session, project, |v| match v {
                CachedView::Session(s) => Some(s.clone()),
                _ => None,
            })
            .await?;
        sessions.truncate(limit);

        let totals = Totals::from_sessions(&sessions);
        Ok(SessionUsageList { sessions, totals })
    }

    /// Monthly breakdown, optionally bounded by inclusive `YYYY-MM` months
    pub async fn get_monthly_usage(
        &self,
        project: Option<&str>,
        start_month: Option<&str>,
        end_month: Option<&str>,
    ) -> Result<MonthlyUsageList> {
        let mut filter = MonthFilter::new();
        if let Some(start) = start_month {
            let (year, month) = parse_month_filter(start)?;
            filter = filter.with_since(year, month);
        }
        if let Some(end) = end_month {
            let (year, month) = parse_month_filter(end)?;
            filter = filter.with_until(year, month);
        }

        let mut monthly = self
            .cached(CacheKind::Monthly, project, |v| match v {
                CachedView::Monthly(m) => Some(m.clone()),
                _ => None,
            })
            .await?;
        monthly.retain(|m| filter.matches_month_key(&m.month));

        let totals = Totals::from_monthly(&monthly);
        Ok(MonthlyUsageList { monthly, totals })
    }

    /// Session blocks
    ///
    /// `active` keeps only the active block. Otherwise `recent` keeps active
    /// blocks plus those that started in the last [`RECENT_BLOCK_DAYS`] days.
    pub async fn get_block_usage(
        &self,
        project: Option<&str>,
        recent: bool,
        active: bool,
    ) -> Result<BlockUsageList> {
        let mut blocks = self
            .cached(CacheKind::Block, project, |v| match v {
                CachedView::Block(b) => Some(b.clone()),
                _ => None,
            })
            .await?;

        if active {
            blocks.retain(|b| b.is_active);
        } else if recent {
            blocks = filter_recent_blocks(blocks, RECENT_BLOCK_DAYS, self.clock.now());
        }

        let totals = Totals::from_blocks(&blocks);
        Ok(BlockUsageList { blocks, totals })
    }

    /// Drop cached views
    ///
    /// `None` for `kind` matches every kind; `None` for `project` matches
    /// every project. Returns the number of views removed.
    pub async fn invalidate_cache(&self, kind: Option<CacheKind>, project: Option<&str>) -> usize {
        let mut cache = self.cache.write().await;
        let before = cache.len();
        cache.retain(|(k, p), _| {
            let kind_matches = kind.is_none_or(|kind| kind == *k);
            let project_matches = project.is_none_or(|project| p.as_deref() == Some(project));
            !(kind_matches && project_matches)
        });
        let removed = before - cache.len();
        info!(
            kind = ?kind,
            project = ?project,
            removed,
            "Invalidated usage cache"
        );
        removed
    }

    async fn cached<T>(
        &self,
        kind: CacheKind,
        project: Option<&str>,
        extract: fn(&CachedView) -> Option<T>,
    ) -> Result<T> {
        let key: CacheKey = (kind, project.map(str::to_string));

        if !self.cache_ttl.is_zero() {
            let cache = self.cache.read().await;
            if let Some(slot) = cache.get(&key) {
                if slot.stored_at.elapsed() < self.cache_ttl {
                    if let Some(view) = extract(&slot.view) {
                        debug!(%kind, ?project, "Cache hit");
                        return Ok(view);
                    }
                }
            }
        }

        let entries = self.source.load_entries(project).await?;
        let computed = self.compute(kind, &entries);
        let value = extract(&computed).ok_or_else(|| {
            DeckstatError::Server(format!("computed view does not match cache kind {kind}"))
        })?;

        if !self.cache_ttl.is_zero() {
            self.cache.write().await.insert(
                key,
                CacheSlot {
                    stored_at: Instant::now(),
                    view: computed,
                },
            );
        }

        Ok(value)
    }

    fn compute(&self, kind: CacheKind, entries: &[UsageEntry]) -> CachedView {
        debug!(%kind, entries = entries.len(), "Computing usage view");
        match kind {
            CacheKind::Summary => CachedView::Summary(self.summarize(entries)),
            CacheKind::Daily => CachedView::Daily(self.aggregator.aggregate_by_daily(entries)),
            CacheKind::Session => {
                CachedView::Session(self.aggregator.aggregate_by_session(entries))
            }
            CacheKind::Monthly => {
                CachedView::Monthly(self.aggregator.aggregate_by_monthly(entries))
            }
            CacheKind::Block => CachedView::Block(identify_session_blocks_with(
                entries,
                self.clock.now(),
                self.aggregator.cost_mode(),
                &self.calculator,
            )),
        }
    }

    fn summarize(&self, entries: &[UsageEntry]) -> UsageSummary {
        let daily = self.aggregator.aggregate_by_daily(entries);
        let totals = Totals::from_daily(&daily);
        let models: BTreeSet<&str> = daily
            .iter()
            .flat_map(|d| d.models_used.iter().map(String::as_str))
            .collect();
        let sessions: HashSet<&str> = entries.iter().map(|e| e.session_id.as_str()).collect();
        let projects: HashSet<&str> = entries.iter().map(|e| e.project_path.as_str()).collect();

        UsageSummary {
            tokens: totals.tokens,
            total_cost: totals.total_cost,
            entry_count: entries.len(),
            session_count: sessions.len(),
            project_count: projects.len(),
            models_used: models.into_iter().map(str::to_string).collect(),
            first_activity: entries.iter().map(|e| *e.timestamp.inner()).min(),
            last_activity: entries.iter().map(|e| *e.timestamp.inner()).max(),
        }
    }
}
