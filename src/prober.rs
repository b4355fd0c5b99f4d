// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Best-effort reachability probe.
//!
//! One task per URL, no cap on fan-out. Every task posts exactly one
//! report to a shared channel; the channel closes once the last task has
//! dropped its sender. Reports arrive in completion order, not input order.

use std::fmt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Outcome of probing one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub url: String,
    pub reachable: bool,
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reachable {
            write!(f, "{} can be reached", self.url)
        } else {
            write!(f, "{} can not be reached", self.url)
        }
    }
}

#[derive(Clone)]
pub struct ReachabilityProber {
    client: reqwest::Client,
}

impl ReachabilityProber {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Probe every URL concurrently and log one line per URL.
    ///
    /// Any HTTP response counts as reachable; only transport errors do not.
    pub async fn probe(&self, urls: &[String]) -> Vec<ProbeReport> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();

        for url in urls {
            let tx = tx.clone();
            let client = self.client.clone();
            let url = url.clone();

            tasks.spawn(async move {
                let reachable = match client.get(url.as_str()).send().await {
                    Ok(_) => true,
                    Err(err) => {
                        warn!(url = %url, error = %err, "Probe failed");
                        false
                    }
                };
                // Receiver outlives every task
                let _ = tx.send(ProbeReport { url, reachable });
            });
        }
        drop(tx);

        let mut reports = Vec::with_capacity(urls.len());
        while let Some(report) = rx.recv().await {
            info!(url = %report.url, reachable = report.reachable, "{}", report);
            reports.push(report);
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "Probe task did not complete");
            }
        }

        reports
    }
}
