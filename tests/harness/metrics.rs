// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for abuse simulations.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    RateLimited,
}

/// Collects outcomes during an abuse simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    outcomes: HashMap<Outcome, usize>,
    /// Allowed requests per client key
    allowed_per_client: HashMap<String, usize>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    pub fn record(&mut self, outcome: Outcome, client: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        if outcome == Outcome::Allowed {
            *self
                .allowed_per_client
                .entry(client.to_string())
                .or_insert(0) += 1;
        }
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Highest number of admissions any single client received.
    pub fn max_allowed_per_client(&self) -> usize {
        self.allowed_per_client.values().copied().max().unwrap_or(0)
    }

    pub fn clients_admitted(&self) -> usize {
        self.allowed_per_client.len()
    }

    pub fn duration(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        self.count(Outcome::RateLimited) as f64 / total as f64
    }
}

impl std::fmt::Display for AttackMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Abuse Simulation Report ===")?;
        writeln!(f, "Duration:          {} ms", self.duration().as_millis())?;
        writeln!(f, "Total Requests:    {}", self.total_requests())?;
        writeln!(f, "Allowed:           {}", self.count(Outcome::Allowed))?;
        writeln!(f, "Rate Limited:      {}", self.count(Outcome::RateLimited))?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate() * 100.0)?;
        writeln!(f, "Clients Admitted:  {}", self.clients_admitted())?;
        writeln!(f, "Max Per Client:    {}", self.max_allowed_per_client())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Allowed, "10.0.0.1");
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimited, "10.0.0.1");
        }

        assert_eq!(metrics.total_requests(), 10);
        assert_eq!(metrics.max_allowed_per_client(), 3);
        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }
}
