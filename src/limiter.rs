// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter keyed by an arbitrary request attribute.
//!
//! Each key owns one [`WindowCounter`], created on first use and kept for
//! the lifetime of the process. The whole lookup, refresh and increment
//! sequence runs under a single table lock, so two concurrent requests for
//! the same key can never both slip past `max_count`.
//!
//! Known limitation: this is a fixed window, not a sliding one. A client
//! that bursts right before and right after a window boundary can be
//! admitted up to `2 * max_count` times in quick succession.

use crate::config::{KeyStrategy, LimiterConfig};
use crate::metrics::Metrics;
use crate::window::WindowCounter;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Key shared by every request when no extractor is configured.
pub const GLOBAL_KEY: &str = "";

/// Maps an inbound request to its rate limit key.
pub type KeyExtractor = Arc<dyn Fn(&Request) -> String + Send + Sync>;

/// Builds the response sent to a client that exceeded its quota.
/// Receives the request and the time until its window resets.
pub type RejectionHandler = Arc<dyn Fn(&Request, Duration) -> Response + Send + Sync>;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Thread-safe fixed-window rate limiter.
pub struct RateLimiter {
    config: LimiterConfig,
    table: Mutex<HashMap<String, WindowCounter>>,
    key_extractor: Option<KeyExtractor>,
    rejection: RwLock<Option<RejectionHandler>>,
    metrics: Option<Metrics>,
}

impl RateLimiter {
    /// Create a limiter where every request shares one global bucket.
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            config,
            table: Mutex::new(HashMap::new()),
            key_extractor: None,
            rejection: RwLock::new(None),
            metrics: None,
        }
    }

    /// Group requests by the key returned from `extractor`.
    pub fn with_key_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&Request) -> String + Send + Sync + 'static,
    {
        self.key_extractor = Some(Arc::new(extractor));
        self
    }

    /// Group requests according to a configured [`KeyStrategy`].
    pub fn with_key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_extractor = key_extractor(strategy);
        self
    }

    /// Record allow/deny decisions made by [`enforce`].
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> LimiterConfig {
        self.config
    }

    /// Replace the rejection response for all subsequent denials.
    pub fn on_limit_reached<F>(&self, handler: F)
    where
        F: Fn(&Request, Duration) -> Response + Send + Sync + 'static,
    {
        let mut rejection = self.rejection.write().unwrap_or_else(|e| e.into_inner());
        *rejection = Some(Arc::new(handler));
    }

    /// Count one request against `key` and report whether it fits the quota.
    pub async fn allow(&self, key: &str) -> bool {
        self.check(key).await.is_allowed()
    }

    /// Count one request against `key`.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        let interval = self.config.interval();
        let max_count = self.config.max_count();

        let (count, window_left) = {
            let mut table = self.table.lock().await;
            let now = Instant::now();
            let counter = table
                .entry(key.to_string())
                .or_insert_with(|| WindowCounter::new(now, interval));

            if counter.is_stale(now) {
                counter.refresh(now, interval);
            }

            (counter.increment(), counter.remaining_window(now))
        };

        if count <= max_count {
            RateLimitResult::Allowed {
                remaining: max_count - count,
                reset_in: window_left,
            }
        } else {
            debug!(key, count, ?window_left, "Rate limit exceeded");
            RateLimitResult::Limited {
                retry_after: window_left,
            }
        }
    }

    /// Number of keys that have been seen so far.
    pub async fn tracked_keys(&self) -> usize {
        self.table.lock().await.len()
    }

    /// Key for `request`, or [`GLOBAL_KEY`] without an extractor.
    pub fn key_for(&self, request: &Request) -> String {
        match &self.key_extractor {
            Some(extract) => extract(request),
            None => GLOBAL_KEY.to_string(),
        }
    }

    fn reject(&self, request: &Request, retry_after: Duration) -> Response {
        let handler = self
            .rejection
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        match handler {
            Some(handler) => handler(request, retry_after),
            None => default_rejection(retry_after),
        }
    }
}

/// Rate limiting middleware.
///
/// Mount with `axum::middleware::from_fn_with_state(limiter, enforce)`.
/// Denied requests get the rejection response and never reach `next`.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = limiter.key_for(&request);
    let result = limiter.check(&key).await;

    if let Some(metrics) = &limiter.metrics {
        metrics.record_decision(result.is_allowed());
    }

    match result {
        RateLimitResult::Allowed { remaining, .. } => {
            debug!(key = %key, remaining, "Request allowed");
            next.run(request).await
        }
        RateLimitResult::Limited { retry_after } => {
            info!(
                key = %key,
                retry_after_secs = retry_after_secs(retry_after),
                "Request rate limited"
            );
            limiter.reject(&request, retry_after)
        }
    }
}

fn default_rejection(retry_after: Duration) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, retry_after_secs(retry_after).to_string())],
        "too many requests",
    )
        .into_response()
}

/// Whole seconds, rounded up.
fn retry_after_secs(retry_after: Duration) -> u64 {
    retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0)
}

/// Build the extractor for a configured strategy. `Global` needs none.
pub fn key_extractor(strategy: KeyStrategy) -> Option<KeyExtractor> {
    match strategy {
        KeyStrategy::Global => None,
        KeyStrategy::PeerIp => Some(Arc::new(|request: &Request| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| GLOBAL_KEY.to_string())
        })),
        KeyStrategy::Header(name) => Some(Arc::new(move |request: &Request| {
            request
                .headers()
                .get(name.as_str())
                .and_then(|v| v.to_str().ok())
                // X-Forwarded-For style lists: the first hop is the client
                .and_then(|v| v.split(',').next())
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| GLOBAL_KEY.to_string())
        })),
    }
}
