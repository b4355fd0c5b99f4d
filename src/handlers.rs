// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers and routing for the URL digest service.
//!
//! `/urls` is the only rate limited route. The health and metrics routes
//! sit outside the limiter so probes and scrapers never consume quota.

use crate::batch::UrlBatch;
use crate::config::Config;
use crate::digest::DigestPipeline;
use crate::error::{AppError, Result};
use crate::limiter::{enforce, RateLimiter};
use crate::metrics::Metrics;
use crate::prober::ReachabilityProber;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, Method},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub prober: ReachabilityProber,
    pub pipeline: DigestPipeline,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, limiter: Arc<RateLimiter>, metrics: Metrics) -> Self {
        Self::with_client(config, limiter, metrics, reqwest::Client::new())
    }

    /// Wire the prober and pipeline to one shared HTTP client.
    pub fn with_client(
        config: Config,
        limiter: Arc<RateLimiter>,
        metrics: Metrics,
        client: reqwest::Client,
    ) -> Self {
        Self {
            limiter,
            prober: ReachabilityProber::new(client.clone()),
            pipeline: DigestPipeline::new(client),
            metrics,
            config,
        }
    }
}

/// Successful `/urls` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct DigestResponse {
    pub message: String,
    pub data: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let limited = Router::new()
        .route("/urls", post(digest_urls).fallback(method_not_supported))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            enforce,
        ));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    if state.config.metrics.enabled {
        match state.config.metrics.route_path() {
            Ok(path) => app = app.route(&path, get(metrics)),
            Err(e) => warn!(error = %e, "Metrics endpoint not mounted"),
        }
    }

    let server = &state.config.server;
    app.merge(limited)
        .fallback(not_found)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "url-digest-service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}

/// Probe and digest a batch of URLs.
///
/// The probe only feeds the log. The digests in the response come from
/// the pipeline, which fails the whole batch on the first transport error.
pub async fn digest_urls(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<DigestResponse>> {
    let start = Instant::now();
    let batch = UrlBatch::from_body(&body)?;

    let reports = state.prober.probe(batch.urls()).await;
    for report in &reports {
        state.metrics.record_probe(report.reachable);
    }
    info!(
        urls = batch.len(),
        elapsed_secs = start.elapsed().as_secs_f64(),
        "Reachability probe finished"
    );

    let report = match state.pipeline.run(batch.urls()).await {
        Ok(report) => report,
        Err(err) => {
            state.metrics.record_batch_failure();
            warn!(error = %err, "Batch aborted");
            return Err(err.into());
        }
    };
    state
        .metrics
        .record_fetch(report.digests.len() as u64, report.omitted as u64);

    info!(
        digested = report.digests.len(),
        omitted = report.omitted,
        elapsed_secs = start.elapsed().as_secs_f64(),
        "Batch digested"
    );

    Ok(Json(DigestResponse {
        message: "Status OK".to_string(),
        data: report.joined(),
    }))
}

async fn method_not_supported(method: Method) -> AppError {
    AppError::MethodNotSupported(method)
}

async fn not_found() -> AppError {
    AppError::NotFound
}
