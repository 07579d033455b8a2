//! Shared helpers for deckstat integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use deckstat::data_loader::DataLoader;
use deckstat_core::types::{ISOTimestamp, ModelName, SessionId, TokenCounts, UsageEntry};
use std::fs;
use tempfile::TempDir;

/// Models with built-in pricing
pub const TEST_MODELS: &[&str] = &[
    "claude-sonnet-4-20250514",
    "claude-opus-4-20250514",
    "claude-3-5-haiku-20241022",
];

pub const TEST_PROJECTS: &[&str] = &["/home/dev/alpha", "/home/dev/beta", "/home/dev/gamma"];

/// Fixed reference point so block activity is deterministic
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
}

/// Builder for test [`UsageEntry`] values
pub struct UsageEntryBuilder {
    session_id: String,
    timestamp: DateTime<Utc>,
    model: Option<String>,
    input_tokens: u64,
    output_tokens: u64,
    cache_creation_tokens: u64,
    cache_read_tokens: u64,
    cost_usd: Option<f64>,
    project: String,
    message_id: Option<String>,
    request_id: Option<String>,
}

impl UsageEntryBuilder {
    pub fn new() -> Self {
        Self {
            session_id: "test-session".to_string(),
            timestamp: base_time(),
            model: Some(TEST_MODELS[0].to_string()),
            input_tokens: 1000,
            output_tokens: 500,
            cache_creation_tokens: 0,
            cache_read_tokens: 0,
            cost_usd: None,
            project: TEST_PROJECTS[0].to_string(),
            message_id: None,
            request_id: None,
        }
    }

    pub fn with_session_id(mut self, id: &str) -> Self {
        self.session_id = id.to_string();
        self
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }

    /// Offset from [`base_time`] in minutes
    pub fn at_minutes(mut self, minutes: i64) -> Self {
        self.timestamp = base_time() + Duration::minutes(minutes);
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn without_model(mut self) -> Self {
        self.model = None;
        self
    }

    pub fn with_tokens(mut self, input: u64, output: u64) -> Self {
        self.input_tokens = input;
        self.output_tokens = output;
        self
    }

    pub fn with_cache_tokens(mut self, creation: u64, read: u64) -> Self {
        self.cache_creation_tokens = creation;
        self.cache_read_tokens = read;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost_usd = Some(cost);
        self
    }

    pub fn with_project(mut self, project: &str) -> Self {
        self.project = project.to_string();
        self
    }

    /// Message and request ids, used for deduplication
    pub fn with_ids(mut self, message_id: &str, request_id: &str) -> Self {
        self.message_id = Some(message_id.to_string());
        self.request_id = Some(request_id.to_string());
        self
    }

    pub fn build(self) -> UsageEntry {
        UsageEntry {
            timestamp: ISOTimestamp::new(self.timestamp),
            tokens: TokenCounts::new(
                self.input_tokens,
                self.output_tokens,
                self.cache_creation_tokens,
                self.cache_read_tokens,
            ),
            cost_usd: self.cost_usd,
            model: self.model.map(ModelName::new),
            session_id: SessionId::new(self.session_id),
            project_path: self.project,
            version: None,
        }
    }

    /// Render as a Claude Code transcript line
    #[allow(clippy::wrong_self_convention)]
    pub fn to_jsonl(self) -> String {
        let mut message = serde_json::json!({
            "usage": {
                "input_tokens": self.input_tokens,
                "output_tokens": self.output_tokens,
                "cache_creation_input_tokens": self.cache_creation_tokens,
                "cache_read_input_tokens": self.cache_read_tokens,
            }
        });
        if let Some(model) = &self.model {
            message["model"] = serde_json::json!(model);
        }
        if let Some(id) = &self.message_id {
            message["id"] = serde_json::json!(id);
        }

        let mut line = serde_json::json!({
            "type": "assistant",
            "sessionId": self.session_id,
            "timestamp": self.timestamp.to_rfc3339(),
            "cwd": self.project,
            "message": message,
        });
        if let Some(cost) = self.cost_usd {
            line["costUSD"] = serde_json::json!(cost);
        }
        if let Some(id) = &self.request_id {
            line["requestId"] = serde_json::json!(id);
        }
        line.to_string()
    }
}

impl Default for UsageEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write transcript files under `<tmp>/<project-dir>/<file>` and return a loader
pub fn create_test_data_dir(files: &[(&str, &str, Vec<String>)]) -> (TempDir, DataLoader) {
    let temp_dir = TempDir::new().unwrap();
    for (project_dir, file, lines) in files {
        let dir = temp_dir.path().join(project_dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), lines.join("\n")).unwrap();
    }
    let loader = DataLoader::from_path(temp_dir.path());
    (temp_dir, loader)
}

/// Entries spread over `days` days, two sessions a day, cycling models
pub fn generate_entries(days: i64) -> Vec<UsageEntry> {
    let mut entries = Vec::new();
    for day in 0..days {
        for (slot, hour) in [0i64, 8].into_iter().enumerate() {
            for i in 0..3 {
                let n = (day as usize) * 6 + slot * 3 + i as usize;
                let timestamp = base_time()
                    + Duration::days(day)
                    + Duration::hours(hour)
                    + Duration::minutes(i * 10);
                entries.push(
                    UsageEntryBuilder::new()
                        .with_session_id(&format!("session-{day}-{slot}"))
                        .with_timestamp(timestamp)
                        .with_model(TEST_MODELS[n % TEST_MODELS.len()])
                        .with_project(TEST_PROJECTS[slot % TEST_PROJECTS.len()])
                        .with_tokens(1000 + n as u64, 200)
                        .build(),
                );
            }
        }
    }
    entries
}

/// Whether two costs agree to within floating-point noise
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9 * a.abs().max(b.abs()).max(1.0)
}
