// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! URL Digest Service
//!
//! Accepts `POST /urls` with `{"urls": "<CRLF-separated list>"}` and
//! returns the SHA-1 digest of every URL that answered 200, in order.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_INTERVAL_SECS`: Window length in seconds (default: 10)
//! - `RATE_LIMIT_MAX_COUNT`: Requests per key per window (default: 100)
//! - `RATE_LIMIT_KEY`: `global`, `peer-ip` or `header:<name>` (default: global)
//! - `REQUEST_TIMEOUT_SECS`: Deadline for a whole request (default: 10)
//! - `MAX_BODY_BYTES`: Request body cap (default: 1048576)
//! - `METRICS_ENABLED`: Serve Prometheus metrics (default: true)
//! - `METRICS_PATH`: Metrics endpoint path (default: /metrics)

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use url_digest_service::{
    config::{Config, MetricsConfig, RateLimitConfig, ServerConfig},
    handlers::{router, AppState},
    limiter::RateLimiter,
    metrics::Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config();
    config.validate()?;
    info!(
        bind_addr = %config.bind_addr,
        interval_secs = config.rate_limit.interval_secs,
        max_count = config.rate_limit.max_count,
        key = %config.rate_limit.key,
        request_timeout_secs = config.server.request_timeout_secs,
        "Starting URL digest service"
    );

    // Create application state
    let metrics = Metrics::new()?;
    let limiter = RateLimiter::new(config.rate_limit.limiter_config()?)
        .with_key_strategy(config.rate_limit.key_strategy()?)
        .with_metrics(metrics.clone());

    let state = Arc::new(AppState::new(config.clone(), Arc::new(limiter), metrics));
    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    let rate_limit = RateLimitConfig::default();
    let server = ServerConfig::default();
    let metrics = MetricsConfig::default();

    Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        rate_limit: RateLimitConfig {
            interval_secs: env_or("RATE_LIMIT_INTERVAL_SECS", rate_limit.interval_secs),
            max_count: env_or("RATE_LIMIT_MAX_COUNT", rate_limit.max_count),
            key: std::env::var("RATE_LIMIT_KEY").unwrap_or(rate_limit.key),
        },
        server: ServerConfig {
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", server.request_timeout_secs),
            max_body_bytes: env_or("MAX_BODY_BYTES", server.max_body_bytes),
        },
        metrics: MetricsConfig {
            enabled: env_or("METRICS_ENABLED", metrics.enabled),
            path: std::env::var("METRICS_PATH").unwrap_or(metrics.path),
        },
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
