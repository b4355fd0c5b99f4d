// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! URL Digest Service
//!
//! A rate limited HTTP endpoint that accepts a batch of URLs, logs which
//! of them are reachable, and answers with a SHA-1 digest of each URL's
//! body in submission order:
//!
//! - Fixed-window rate limiting keyed by a request attribute
//! - Concurrent best-effort reachability probing
//! - Ordered fetch-and-hash with fail-fast transport errors
//! - Non-200 responses silently omitted

pub mod batch;
pub mod config;
pub mod digest;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod prober;
pub mod window;

pub use config::{Config, LimiterConfig};
pub use digest::{digest_hex, DigestPipeline, DigestReport};
pub use limiter::{RateLimitResult, RateLimiter};
pub use prober::{ProbeReport, ReachabilityProber};
