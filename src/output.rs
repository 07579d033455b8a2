//! Output formatting for the report commands
//!
//! Two formatters are provided:
//! - [`TableFormatter`] renders terminal tables with thousands separators
//!   and short model names
//! - [`JsonFormatter`] emits the same JSON documents the HTTP API returns
//!
//! # Examples
//!
//! ```
//! use deckstat::output::get_formatter;
//! use deckstat::service::DailyUsageList;
//! use deckstat_core::aggregation_types::{DailyUsage, Totals};
//! use deckstat_core::types::{DailyDate, TokenCounts};
//! use chrono::NaiveDate;
//!
//! let daily = vec![DailyUsage {
//!     date: DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
//!     tokens: TokenCounts::new(1000, 500, 100, 50),
//!     total_cost: 0.025,
//!     models_used: vec!["claude-sonnet-4-20250514".to_string()],
//! }];
//! let totals = Totals::from_daily(&daily);
//! let list = DailyUsageList { daily, totals };
//!
//! println!("{}", get_formatter(false, false).format_daily(&list));
//! println!("{}", get_formatter(true, false).format_daily(&list));
//! ```

use crate::blocks::{SESSION_DURATION, floor_to_hour};
use crate::model_formatter::format_model_list;
use crate::service::{
    BlockUsageList, DailyUsageList, MonthlyUsageList, SessionUsageList, UsageSummary,
};
use chrono::{DateTime, Utc};
use colored::Colorize;
use deckstat_core::aggregation_types::Totals;
use deckstat_pricing::{ModelPricing, PricingTable};
use prettytable::{Cell, Row, Table, format, row};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

/// Renders service views for the terminal
pub trait OutputFormatter {
    fn format_summary(&self, summary: &UsageSummary) -> String;

    fn format_daily(&self, data: &DailyUsageList) -> String;

    fn format_sessions(&self, data: &SessionUsageList) -> String;

    fn format_monthly(&self, data: &MonthlyUsageList) -> String;

    /// Session blocks, including gap rows
    fn format_blocks(&self, data: &BlockUsageList) -> String;

    /// Built-in pricing table
    fn format_models(&self, table: &PricingTable) -> String;
}

/// Human-readable tables
pub struct TableFormatter {
    /// Show `claude-sonnet-4-20250514` instead of `Sonnet 4`
    pub full_model_names: bool,
}

impl TableFormatter {
    pub fn new(full_model_names: bool) -> Self {
        Self { full_model_names }
    }

    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let digits = n.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }

    fn format_currency(amount: f64) -> String {
        format!("${amount:.2}")
    }

    /// Per-million-token price, the unit pricing pages use
    fn format_rate(per_token: f64) -> String {
        format!("${:.2}", per_token * 1_000_000.0)
    }

    fn format_timestamp(dt: &DateTime<Utc>) -> String {
        dt.format("%Y-%m-%d %H:%M UTC").to_string()
    }

    fn format_duration(duration: chrono::Duration) -> String {
        let minutes = duration.num_minutes().max(0);
        format!("{}h {}m", minutes / 60, minutes % 60)
    }

    fn new_table(titles: Row) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(titles);
        table
    }

    fn token_titles(first: &str, last: &str) -> Row {
        row![
            b -> first,
            b -> "Input",
            b -> "Output",
            b -> "Cache Create",
            b -> "Cache Read",
            b -> "Total",
            b -> "Cost",
            b -> last
        ]
    }

    /// Separator and bold totals row closing a report table
    fn push_totals(table: &mut Table, totals: &Totals) {
        table.add_row(Row::new(vec![Cell::new(""); 8]));
        table.add_row(row![
            b -> "TOTAL",
            br -> Self::format_number(totals.tokens.input_tokens),
            br -> Self::format_number(totals.tokens.output_tokens),
            br -> Self::format_number(totals.tokens.cache_creation_tokens),
            br -> Self::format_number(totals.tokens.cache_read_tokens),
            br -> Self::format_number(totals.tokens.total()),
            br -> Self::format_currency(totals.total_cost),
            ""
        ]);
    }

    fn empty_notice(what: &str) -> String {
        format!("{}\n", format!("No {what} found").yellow())
    }

    /// Blocks table as of `now`, which drives the time-remaining column
    pub fn format_blocks_at(&self, data: &BlockUsageList, now: DateTime<Utc>) -> String {
        if data.blocks.is_empty() {
            return Self::empty_notice("session blocks");
        }

        let mut table = Self::new_table(row![
            b -> "Block Start",
            b -> "Status",
            b -> "Duration",
            b -> "Entries",
            b -> "Total Tokens",
            b -> "Cost",
            b -> "Remaining",
            b -> "Models"
        ]);

        for block in &data.blocks {
            let start = Self::format_timestamp(&floor_to_hour(block.start_time));
            let duration = Self::format_duration(block.duration());

            if block.is_gap {
                table.add_row(row![
                    i -> start,
                    i -> "Gap",
                    i -> duration,
                    "", "", "", "", ""
                ]);
                continue;
            }

            let remaining = if block.is_active {
                Self::format_duration(block.end_time + SESSION_DURATION - now)
            } else {
                "-".to_string()
            };

            let status = if block.is_active {
                Cell::new("ACTIVE").style_spec("bFg")
            } else {
                Cell::new("Complete")
            };

            table.add_row(Row::new(vec![
                Cell::new(&start),
                status,
                Cell::new(&duration),
                Cell::new(&block.entry_count.to_string()).style_spec("r"),
                Cell::new(&Self::format_number(block.tokens.total())).style_spec("r"),
                Cell::new(&Self::format_currency(block.total_cost)).style_spec("r"),
                Cell::new(&remaining),
                Cell::new(&format_model_list(
                    &block.models_used,
                    self.full_model_names,
                    ", ",
                )),
            ]));
        }

        Self::push_totals(&mut table, &data.totals);
        table.to_string()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_summary(&self, summary: &UsageSummary) -> String {
        if summary.entry_count == 0 {
            return Self::empty_notice("usage data");
        }

        let span = match (summary.first_activity, summary.last_activity) {
            (Some(first), Some(last)) => format!(
                "{} to {}",
                Self::format_timestamp(&first),
                Self::format_timestamp(&last)
            ),
            _ => "-".to_string(),
        };

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        let counts = [
            ("Entries", summary.entry_count as u64),
            ("Sessions", summary.session_count as u64),
            ("Projects", summary.project_count as u64),
            ("Input tokens", summary.tokens.input_tokens),
            ("Output tokens", summary.tokens.output_tokens),
            ("Cache create", summary.tokens.cache_creation_tokens),
            ("Cache read", summary.tokens.cache_read_tokens),
            ("Total tokens", summary.tokens.total()),
        ];
        for (label, value) in counts {
            table.add_row(row![b -> label, r -> Self::format_number(value)]);
        }
        table.add_row(row![b -> "Activity", span]);
        table.add_row(row![
            b -> "Models",
            format_model_list(&summary.models_used, self.full_model_names, ", ")
        ]);

        format!(
            "{}{} {}\n",
            table,
            "Total cost:".bold(),
            Self::format_currency(summary.total_cost).green().bold()
        )
    }

    fn format_daily(&self, data: &DailyUsageList) -> String {
        if data.daily.is_empty() {
            return Self::empty_notice("daily usage");
        }

        let mut table = Self::new_table(Self::token_titles("Date", "Models"));
        for day in &data.daily {
            table.add_row(row![
                day.date.format("%Y-%m-%d"),
                r -> Self::format_number(day.tokens.input_tokens),
                r -> Self::format_number(day.tokens.output_tokens),
                r -> Self::format_number(day.tokens.cache_creation_tokens),
                r -> Self::format_number(day.tokens.cache_read_tokens),
                r -> Self::format_number(day.tokens.total()),
                r -> Self::format_currency(day.total_cost),
                format_model_list(&day.models_used, self.full_model_names, ", ")
            ]);
        }

        Self::push_totals(&mut table, &data.totals);
        table.to_string()
    }

    fn format_sessions(&self, data: &SessionUsageList) -> String {
        if data.sessions.is_empty() {
            return Self::empty_notice("sessions");
        }

        let mut table = Self::new_table(Self::token_titles("Session", "Last Activity"));
        for session in &data.sessions {
            table.add_row(row![
                format!("{}\n{}", session.session_id, session.project_path),
                r -> Self::format_number(session.tokens.input_tokens),
                r -> Self::format_number(session.tokens.output_tokens),
                r -> Self::format_number(session.tokens.cache_creation_tokens),
                r -> Self::format_number(session.tokens.cache_read_tokens),
                r -> Self::format_number(session.tokens.total()),
                r -> Self::format_currency(session.total_cost),
                Self::format_timestamp(&session.end_time)
            ]);
        }

        Self::push_totals(&mut table, &data.totals);
        table.to_string()
    }

    fn format_monthly(&self, data: &MonthlyUsageList) -> String {
        if data.monthly.is_empty() {
            return Self::empty_notice("monthly usage");
        }

        let mut table = Self::new_table(Self::token_titles("Month", "Active Days"));
        for month in &data.monthly {
            table.add_row(row![
                month.month,
                r -> Self::format_number(month.tokens.input_tokens),
                r -> Self::format_number(month.tokens.output_tokens),
                r -> Self::format_number(month.tokens.cache_creation_tokens),
                r -> Self::format_number(month.tokens.cache_read_tokens),
                r -> Self::format_number(month.tokens.total()),
                r -> Self::format_currency(month.total_cost),
                c -> month.active_days
            ]);
        }

        Self::push_totals(&mut table, &data.totals);
        table.to_string()
    }

    fn format_blocks(&self, data: &BlockUsageList) -> String {
        self.format_blocks_at(data, Utc::now())
    }

    fn format_models(&self, pricing: &PricingTable) -> String {
        let mut table = Self::new_table(row![
            b -> "Model",
            b -> "Input",
            b -> "Output",
            b -> "Cache Write",
            b -> "Cache Read",
            b -> "Input >200k"
        ]);

        for model in pricing.supported_models() {
            let Some(p) = pricing.lookup(model) else {
                continue;
            };
            let tiered = p
                .input_cost_per_token_above_200k
                .map(Self::format_rate)
                .unwrap_or_else(|| "-".to_string());
            table.add_row(row![
                model,
                r -> Self::format_rate(p.input_cost_per_token),
                r -> Self::format_rate(p.output_cost_per_token),
                r -> Self::format_rate(p.cache_creation_input_token_cost),
                r -> Self::format_rate(p.cache_read_input_token_cost),
                r -> tiered
            ]);
        }

        format!("{}{}\n", table, "Prices in USD per million tokens".dimmed())
    }
}

/// Machine-readable output, identical to the HTTP API bodies
pub struct JsonFormatter;

impl JsonFormatter {
    fn render<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            warn!("Failed to serialize output: {}", e);
            String::from("{}")
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_summary(&self, summary: &UsageSummary) -> String {
        Self::render(summary)
    }

    fn format_daily(&self, data: &DailyUsageList) -> String {
        Self::render(data)
    }

    fn format_sessions(&self, data: &SessionUsageList) -> String {
        Self::render(data)
    }

    fn format_monthly(&self, data: &MonthlyUsageList) -> String {
        Self::render(data)
    }

    fn format_blocks(&self, data: &BlockUsageList) -> String {
        Self::render(data)
    }

    fn format_models(&self, pricing: &PricingTable) -> String {
        let models: Vec<_> = pricing
            .supported_models()
            .into_iter()
            .filter_map(|name| pricing.lookup(name).map(|p| (name, p)))
            .map(|(name, p): (&str, &ModelPricing)| json!({ "model": name, "pricing": p }))
            .collect();
        Self::render(&json!({ "models": models }))
    }
}

/// Table or JSON formatter depending on `--json`
pub fn get_formatter(json: bool, full_model_names: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(full_model_names))
    }
}
