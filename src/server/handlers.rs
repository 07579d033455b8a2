use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::service::{CacheKind, UsageService};

use super::errors::HttpError;

pub type AppState = Arc<UsageService>;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    pub project_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyQuery {
    pub project_path: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    pub project_path: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthlyQuery {
    pub project_path: Option<String>,
    pub start_month: Option<String>,
    pub end_month: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct BlockQuery {
    pub project_path: Option<String>,
    #[serde(default = "default_true")]
    pub recent: bool,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvalidateQuery {
    pub cache_type: Option<String>,
    pub project_path: Option<String>,
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn usage_summary(
    State(service): State<AppState>,
    Query(q): Query<ProjectQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let summary = service.get_usage_summary(q.project_path.as_deref()).await?;
    Ok(Json(summary))
}

pub async fn daily_usage(
    State(service): State<AppState>,
    Query(q): Query<DailyQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let daily = service
        .get_daily_usage(
            q.project_path.as_deref(),
            q.start_date.as_deref(),
            q.end_date.as_deref(),
        )
        .await?;
    Ok(Json(daily))
}

pub async fn session_usage(
    State(service): State<AppState>,
    Query(q): Query<SessionQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let sessions = service
        .get_session_usage(q.project_path.as_deref(), q.limit)
        .await?;
    Ok(Json(sessions))
}

pub async fn monthly_usage(
    State(service): State<AppState>,
    Query(q): Query<MonthlyQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let monthly = service
        .get_monthly_usage(
            q.project_path.as_deref(),
            q.start_month.as_deref(),
            q.end_month.as_deref(),
        )
        .await?;
    Ok(Json(monthly))
}

pub async fn block_usage(
    State(service): State<AppState>,
    Query(q): Query<BlockQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let blocks = service
        .get_block_usage(q.project_path.as_deref(), q.recent, q.active)
        .await?;
    Ok(Json(blocks))
}

pub async fn invalidate_cache(
    State(service): State<AppState>,
    Query(q): Query<InvalidateQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let kind = q
        .cache_type
        .as_deref()
        .map(str::parse::<CacheKind>)
        .transpose()?;
    let removed = service
        .invalidate_cache(kind, q.project_path.as_deref())
        .await;
    Ok(Json(json!({
        "status": "ok",
        "message": "Cache invalidated",
        "removed": removed,
    })))
}
