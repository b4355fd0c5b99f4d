// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for the URL digest service.
//!
//! Provides a local upstream to fetch from, request generators, abuse
//! patterns for the rate limiter, and a small outcome collector.

pub mod attacks;
pub mod generators;
pub mod metrics;
pub mod upstream;
