// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window request counter.
//!
//! A counter is only ever touched while the limiter's table lock is held,
//! so the staleness check, refresh and increment form one atomic step.

use std::time::Duration;
use tokio::time::Instant;

/// Per-key request counter valid until `expires_at`.
#[derive(Debug, Clone)]
pub struct WindowCounter {
    count: u32,
    expires_at: Instant,
}

impl WindowCounter {
    /// Open a fresh window starting at `now`.
    pub fn new(now: Instant, interval: Duration) -> Self {
        Self {
            count: 0,
            expires_at: now + interval,
        }
    }

    /// True once `now` has reached the end of the window.
    pub fn is_stale(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Reset the count and start a new window at `now`.
    pub fn refresh(&mut self, now: Instant, interval: Duration) {
        self.count = 0;
        self.expires_at = now + interval;
    }

    pub(crate) fn increment(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Time left in the window as seen from `now`.
    pub fn remaining_window(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}
