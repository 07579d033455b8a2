//! Transcripts on disk through the loader, service and formatters

mod common;

use chrono::{DateTime, Duration, Utc};
use common::{UsageEntryBuilder, approx_eq, base_time, create_test_data_dir};
use deckstat::data_loader::UsageSource;
use deckstat::output::{JsonFormatter, OutputFormatter, TableFormatter};
use deckstat::service::{CacheKind, Clock, UsageService};
use deckstat_core::types::CostMode;
use std::sync::Arc;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn transcript_fixture() -> Vec<(&'static str, &'static str, Vec<String>)> {
    let alpha = vec![
        UsageEntryBuilder::new()
            .with_session_id("a1")
            .with_project("/home/dev/alpha")
            .with_ids("msg-1", "req-1")
            .at_minutes(0)
            .to_jsonl(),
        UsageEntryBuilder::new()
            .with_session_id("a1")
            .with_project("/home/dev/alpha")
            .with_ids("msg-2", "req-2")
            .with_model("claude-opus-4-20250514")
            .at_minutes(90)
            .to_jsonl(),
        r#"{"type":"user","timestamp":"2024-01-15T10:05:00Z","message":{"role":"user","content":"hi"}}"#
            .to_string(),
        "{ truncated".to_string(),
    ];

    // Replayed response in a resumed session file
    let alpha_resumed = vec![
        UsageEntryBuilder::new()
            .with_session_id("a1")
            .with_project("/home/dev/alpha")
            .with_ids("msg-2", "req-2")
            .with_model("claude-opus-4-20250514")
            .at_minutes(90)
            .to_jsonl(),
    ];

    let beta = vec![
        UsageEntryBuilder::new()
            .with_session_id("b1")
            .with_project("/home/dev/beta")
            .with_ids("msg-3", "req-3")
            .with_cost(0.5)
            .at_minutes(24 * 60)
            .to_jsonl(),
    ];

    vec![
        ("-home-dev-alpha", "a1.jsonl", alpha),
        ("-home-dev-alpha", "a1-resumed.jsonl", alpha_resumed),
        ("-home-dev-beta", "b1.jsonl", beta),
    ]
}

fn service_at(loader: deckstat::data_loader::DataLoader, now: DateTime<Utc>) -> UsageService {
    UsageService::new(Arc::new(loader)).with_clock(Arc::new(FixedClock(now)))
}

#[tokio::test]
async fn test_loader_deduplicates_and_skips_noise() {
    let (_dir, loader) = create_test_data_dir(&transcript_fixture());
    let entries = loader.load_entries(None).await.unwrap();

    assert_eq!(entries.len(), 3);
    assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert_eq!(entries[2].cost_usd, Some(0.5));
}

#[tokio::test]
async fn test_summary_and_daily_from_disk() {
    let (_dir, loader) = create_test_data_dir(&transcript_fixture());
    let service = service_at(loader, base_time() + Duration::days(2));

    let summary = service.get_usage_summary(None).await.unwrap();
    assert_eq!(summary.entry_count, 3);
    assert_eq!(summary.session_count, 2);
    assert_eq!(summary.project_count, 2);
    assert_eq!(
        summary.models_used,
        vec!["claude-opus-4-20250514", "claude-sonnet-4-20250514"]
    );
    // sonnet 0.0105 + opus 0.0525 + recorded 0.5
    assert!(approx_eq(summary.total_cost, 0.563));

    let daily = service.get_daily_usage(None, None, None).await.unwrap();
    assert_eq!(daily.daily.len(), 2);
    assert_eq!(daily.daily[0].date.to_string(), "2024-01-16");
    assert!(approx_eq(daily.daily[0].total_cost, 0.5));
    assert!(approx_eq(daily.totals.total_cost, 0.563));

    let first_day = service
        .get_daily_usage(None, Some("2024-01-15"), Some("2024-01-15"))
        .await
        .unwrap();
    assert_eq!(first_day.daily.len(), 1);
    assert_eq!(first_day.totals.tokens.input_tokens, 2000);
}

#[tokio::test]
async fn test_calculate_mode_ignores_recorded_cost() {
    let (_dir, loader) = create_test_data_dir(&transcript_fixture());
    let service = service_at(loader, base_time()).with_cost_mode(CostMode::Calculate);

    let beta = service
        .get_daily_usage(Some("/home/dev/beta"), None, None)
        .await
        .unwrap();
    assert_eq!(beta.daily.len(), 1);
    assert!(approx_eq(beta.totals.total_cost, 0.0105));
}

#[tokio::test]
async fn test_sessions_and_project_filter() {
    let (_dir, loader) = create_test_data_dir(&transcript_fixture());
    let service = service_at(loader, base_time() + Duration::days(2));

    let sessions = service.get_session_usage(None, None).await.unwrap();
    let ids: Vec<&str> = sessions
        .sessions
        .iter()
        .map(|s| s.session_id.as_str())
        .collect();
    assert_eq!(ids, vec!["b1", "a1"]);

    let alpha = &sessions.sessions[1];
    assert_eq!(alpha.project_path, "/home/dev/alpha");
    assert_eq!(alpha.end_time - alpha.start_time, Duration::minutes(90));

    let only_alpha = service
        .get_session_usage(Some("/home/dev/alpha"), Some(10))
        .await
        .unwrap();
    assert_eq!(only_alpha.sessions.len(), 1);
}

#[tokio::test]
async fn test_blocks_timeline_from_disk() {
    let (_dir, loader) = create_test_data_dir(&transcript_fixture());
    // One hour after the last entry
    let service = service_at(loader, base_time() + Duration::minutes(25 * 60));

    let blocks = service.get_block_usage(None, false, false).await.unwrap();
    assert_eq!(blocks.blocks.len(), 3);

    let first = &blocks.blocks[0];
    assert_eq!(first.entry_count, 2);
    assert!(!first.is_active);
    assert_eq!(first.start_time, base_time());
    assert_eq!(first.end_time, base_time() + Duration::minutes(90));

    assert!(blocks.blocks[1].is_gap);
    assert_eq!(blocks.blocks[1].start_time, first.end_time);
    assert_eq!(blocks.blocks[1].end_time, blocks.blocks[2].start_time);

    assert!(blocks.blocks[2].is_active);
    assert!(approx_eq(blocks.totals.total_cost, 0.563));

    let active = service.get_block_usage(None, true, true).await.unwrap();
    assert_eq!(active.blocks.len(), 1);
    assert!(active.blocks[0].is_active);
}

#[tokio::test]
async fn test_invalidate_reloads_new_transcripts() {
    let (dir, loader) = create_test_data_dir(&transcript_fixture());
    let service = service_at(loader, base_time() + Duration::days(2));

    assert_eq!(service.get_usage_summary(None).await.unwrap().entry_count, 3);

    std::fs::write(
        dir.path().join("-home-dev-beta").join("b2.jsonl"),
        UsageEntryBuilder::new()
            .with_session_id("b2")
            .with_project("/home/dev/beta")
            .with_ids("msg-9", "req-9")
            .at_minutes(30 * 60)
            .to_jsonl(),
    )
    .unwrap();

    // Still served from cache
    assert_eq!(service.get_usage_summary(None).await.unwrap().entry_count, 3);

    let removed = service.invalidate_cache(Some(CacheKind::Summary), None).await;
    assert_eq!(removed, 1);
    assert_eq!(service.get_usage_summary(None).await.unwrap().entry_count, 4);
}

#[tokio::test]
async fn test_formatters_render_service_views() {
    let (_dir, loader) = create_test_data_dir(&transcript_fixture());
    let service = service_at(loader, base_time() + Duration::days(2));

    let monthly = service.get_monthly_usage(None, None, None).await.unwrap();
    assert_eq!(monthly.monthly.len(), 1);
    assert_eq!(monthly.monthly[0].active_days, 2);

    let table = TableFormatter::new(false).format_monthly(&monthly);
    assert!(table.contains("2024-01"));
    assert!(table.contains("TOTAL"));

    let json: serde_json::Value =
        serde_json::from_str(&JsonFormatter.format_monthly(&monthly)).unwrap();
    assert_eq!(json["monthly"][0]["month"], "2024-01");
    assert_eq!(json["totals"]["input_tokens"], 3000);
}

#[tokio::test]
async fn test_invalid_inputs_are_client_errors() {
    let (_dir, loader) = create_test_data_dir(&transcript_fixture());
    let service = service_at(loader, base_time());

    let err = service
        .get_daily_usage(None, Some("15/01/2024"), None)
        .await
        .unwrap_err();
    assert!(err.is_client_error());

    let err = service
        .get_monthly_usage(None, Some("2024-13"), None)
        .await
        .unwrap_err();
    assert!(err.is_client_error());

    let err = service.get_session_usage(None, Some(0)).await.unwrap_err();
    assert!(err.is_client_error());
}
