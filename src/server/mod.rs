//! HTTP API over [`UsageService`]
//!
//! Routes live under `/api/v1/usage`; `/health` answers liveness checks.
//! Responses are the JSON forms of the service's views, errors are
//! `{ "status", "message" }` objects.

mod errors;
mod handlers;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use deckstat_core::error::{DeckstatError, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

use crate::config::Settings;
use crate::service::UsageService;

pub use errors::{ApiError, HttpError};

/// Build the application router
pub fn router(service: Arc<UsageService>, cors: CorsLayer) -> Router {
    let usage = Router::new()
        .route("/summary", get(handlers::usage_summary))
        .route("/daily", get(handlers::daily_usage))
        .route("/sessions", get(handlers::session_usage))
        .route("/monthly", get(handlers::monthly_usage))
        .route("/blocks", get(handlers::block_usage))
        .route("/cache/invalidate", post(handlers::invalidate_cache));

    Router::new()
        .nest("/api/v1/usage", usage)
        .route("/health", get(handlers::health_check))
        .layer(cors)
        .with_state(service)
}

/// CORS policy allowing the given browser origins
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|_| DeckstatError::Config(format!("invalid CORS origin: {o}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any))
}

/// Bind and serve until the process is stopped
pub async fn serve(settings: &Settings, service: Arc<UsageService>) -> Result<()> {
    let app = router(service, cors_layer(&settings.cors_origins)?);
    let addr = settings.bind_address();

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| DeckstatError::Server(format!("failed to bind {addr}: {e}")))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| DeckstatError::Server(e.to_string()))
}
