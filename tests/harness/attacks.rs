// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse patterns for rate limiter testing.

use std::time::Duration;

/// Abuse pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of distinct client keys to rotate through
    pub unique_clients: usize,
    /// Requests admitted per key per window
    pub max_count: u32,
    /// Window length
    pub interval: Duration,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_clients: 1,
            max_count: 10,
            interval: Duration::from_secs(60),
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single client flood within one window.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            unique_clients: 1,
            max_count: 20,
            ..Default::default()
        }
    }

    /// Many clients, each under its own quota.
    pub fn distributed_attack() -> Self {
        Self {
            total_requests: 500,
            unique_clients: 100,
            max_count: 10,
            ..Default::default()
        }
    }

    /// Many clients, each well over its own quota.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 1_000,
            unique_clients: 20,
            max_count: 5,
            ..Default::default()
        }
    }

    /// Admissions expected when requests rotate round-robin over clients
    /// within a single window.
    pub fn expected_allowed(&self) -> usize {
        (0..self.unique_clients)
            .map(|client| {
                let received = self.total_requests / self.unique_clients
                    + usize::from(client < self.total_requests % self.unique_clients);
                received.min(self.max_count as usize)
            })
            .sum()
    }
}
