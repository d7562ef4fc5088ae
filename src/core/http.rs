//! Health and metrics endpoints using Axum

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

use crate::metrics::Metrics;

/// A loop that misses this many poll intervals is reported stale.
const STALE_AFTER_INTERVALS: i64 = 3;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
}

/// Loop progress as seen by the health endpoint. Written by the trading loop
/// at the end of every cycle.
#[derive(Clone, Debug, Default)]
pub struct HealthStatus {
    pub trading_enabled: bool,
    pub instruments: usize,
    pub poll_interval_seconds: u64,
    pub cycles_completed: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_cycle_failures: usize,
}

impl HealthStatus {
    /// `starting` until the first cycle ends, `stale` once the loop stops
    /// reporting, `degraded` when every instrument failed last cycle.
    pub fn state(&self, now: DateTime<Utc>) -> &'static str {
        let Some(last) = self.last_cycle_at else {
            return "starting";
        };
        let interval = i64::try_from(self.poll_interval_seconds).unwrap_or(i64::MAX);
        let stale_after = TimeDelta::try_seconds(interval.saturating_mul(STALE_AFTER_INTERVALS));
        if stale_after.is_some_and(|limit| interval > 0 && now - last > limit) {
            "stale"
        } else if self.instruments > 0 && self.last_cycle_failures >= self.instruments {
            "degraded"
        } else {
            "healthy"
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub uptime_seconds: u64,
    pub trading_enabled: bool,
    pub instruments: usize,
    pub cycles_completed: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_cycle_failures: usize,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = state.health.read().await;
    let status = health.state(Utc::now());
    let code = if status == "stale" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let body = HealthResponse {
        status,
        service: "coinbot",
        uptime_seconds: state.start_time.elapsed().as_secs(),
        trading_enabled: health.trading_enabled,
        instruments: health.instruments,
        cycles_completed: health.cycles_completed,
        last_cycle_at: health.last_cycle_at,
        last_cycle_failures: health.last_cycle_failures,
    };
    (code, Json(body))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state.metrics.export().map_err(|e| {
        warn!(error = %e, "Failed to encode metrics");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Count served requests by route and status.
async fn count_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    state
        .metrics
        .http_requests_total
        .with_label_values(&[route.as_str(), response.status().as_str()])
        .inc();
    response
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            count_requests,
        ))
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                    .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
            ),
        )
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port = port, "Health server listening on port {}", port);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
