// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the URL digest service.
//!
//! Every field has a serde default so partial documents (or an empty
//! environment) still produce a runnable configuration.

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rate limit interval must be greater than zero")]
    ZeroInterval,

    #[error("rate limit max count must be greater than zero")]
    ZeroMaxCount,

    #[error("unknown rate limit key strategy: {0}")]
    UnknownKeyStrategy(String),

    #[error("metrics path {0} collides with a service route")]
    ReservedMetricsPath(String),
}

/// Routes owned by the service itself.
pub const RESERVED_PATHS: &[&str] = &["/urls", "/health", "/healthz"];

/// Configuration for the URL digest service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Server limits
    #[serde(default)]
    pub server: ServerConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds (default: 10)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Requests admitted per key per window (default: 100)
    #[serde(default = "default_max_count")]
    pub max_count: u32,

    /// How requests are grouped into keys: `global`, `peer-ip` or
    /// `header:<name>` (default: global)
    #[serde(default = "default_key")]
    pub key: String,
}

/// HTTP server limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Blanket deadline for a whole request in seconds (default: 10)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum accepted request body in bytes (default: 1 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Validated, immutable limiter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfig {
    interval: Duration,
    max_count: u32,
}

impl LimiterConfig {
    pub fn new(interval: Duration, max_count: u32) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if max_count == 0 {
            return Err(ConfigError::ZeroMaxCount);
        }
        Ok(Self {
            interval,
            max_count,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }
}

/// How inbound requests are mapped to rate limit keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStrategy {
    /// One bucket shared by every request
    Global,
    /// Socket peer IP address
    PeerIp,
    /// Value of the named request header
    Header(String),
}

impl std::str::FromStr for KeyStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "" | "global" => Ok(Self::Global),
            "peer-ip" | "ip" => Ok(Self::PeerIp),
            _ => match s.split_once(':') {
                Some((kind, name)) if kind.eq_ignore_ascii_case("header") => {
                    HeaderName::from_bytes(name.trim().as_bytes())
                        .map(|name| Self::Header(name.as_str().to_string()))
                        .map_err(|_| ConfigError::UnknownKeyStrategy(s.to_string()))
                }
                _ => Err(ConfigError::UnknownKeyStrategy(s.to_string())),
            },
        }
    }
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_max_count() -> u32 {
    100
}

fn default_key() -> String {
    "global".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_body_bytes() -> usize {
    1 << 20
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            server: ServerConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_count: default_max_count(),
            key: default_key(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Config {
    /// Check every setting that would otherwise fail at router construction
    /// or on the first request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rate_limit.limiter_config()?;
        self.rate_limit.key_strategy()?;
        if self.metrics.enabled {
            self.metrics.route_path()?;
        }
        Ok(())
    }
}

impl MetricsConfig {
    /// Path to mount the metrics endpoint on, with a leading slash.
    pub fn route_path(&self) -> Result<String, ConfigError> {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        if RESERVED_PATHS.contains(&path.as_str()) {
            return Err(ConfigError::ReservedMetricsPath(path));
        }
        Ok(path)
    }
}

impl RateLimitConfig {
    /// Validate into limiter parameters.
    pub fn limiter_config(&self) -> Result<LimiterConfig, ConfigError> {
        LimiterConfig::new(Duration::from_secs(self.interval_secs), self.max_count)
    }

    /// Parse the key strategy.
    pub fn key_strategy(&self) -> Result<KeyStrategy, ConfigError> {
        self.key.parse()
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
