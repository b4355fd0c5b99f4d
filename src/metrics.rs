// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for rate limiting and batch processing.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Service metrics backed by a private registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    rate_limit_decisions: IntCounterVec,
    probe_results: IntCounterVec,
    fetch_outcomes: IntCounterVec,
    batch_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let rate_limit_decisions = IntCounterVec::new(
            Opts::new(
                "url_digest_rate_limit_decisions_total",
                "Rate limiter decisions by outcome",
            ),
            &["decision"],
        )?;
        let probe_results = IntCounterVec::new(
            Opts::new(
                "url_digest_probe_results_total",
                "Reachability probe results",
            ),
            &["result"],
        )?;
        let fetch_outcomes = IntCounterVec::new(
            Opts::new(
                "url_digest_fetch_outcomes_total",
                "Per-URL outcomes of the digest pipeline",
            ),
            &["outcome"],
        )?;
        let batch_failures = IntCounter::new(
            "url_digest_batch_failures_total",
            "Batches aborted by a transport failure",
        )?;

        registry.register(Box::new(rate_limit_decisions.clone()))?;
        registry.register(Box::new(probe_results.clone()))?;
        registry.register(Box::new(fetch_outcomes.clone()))?;
        registry.register(Box::new(batch_failures.clone()))?;

        Ok(Self {
            registry,
            rate_limit_decisions,
            probe_results,
            fetch_outcomes,
            batch_failures,
        })
    }

    pub fn record_decision(&self, allowed: bool) {
        let label = if allowed { "allowed" } else { "limited" };
        self.rate_limit_decisions.with_label_values(&[label]).inc();
    }

    pub fn record_probe(&self, reachable: bool) {
        let label = if reachable { "reachable" } else { "unreachable" };
        self.probe_results.with_label_values(&[label]).inc();
    }

    pub fn record_fetch(&self, digested: u64, omitted: u64) {
        self.fetch_outcomes
            .with_label_values(&["digested"])
            .inc_by(digested);
        self.fetch_outcomes
            .with_label_values(&["omitted"])
            .inc_by(omitted);
    }

    pub fn record_batch_failure(&self) {
        self.batch_failures.inc();
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
