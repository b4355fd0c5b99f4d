// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! URL batch decoding.
//!
//! The request body is a JSON object whose `urls` field holds a
//! CRLF-separated list. Lines are kept verbatim and in order; malformed
//! URLs are left for the fetch stage to report.
//!
//! The `urls` key is matched ASCII case-insensitively, preferring an exact
//! `urls` match. A missing or null value decodes as an empty list.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Line separator between URLs in a request, and between digests in a
/// response.
pub const LINE_SEPARATOR: &str = "\r\n";

/// Batch decoding errors.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Body can't be empty")]
    EmptyBody,

    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

/// Key holding the URL list in a `POST /urls` body.
pub const URLS_FIELD: &str = "urls";

/// Ordered list of URLs submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBatch {
    urls: Vec<String>,
}

impl UrlBatch {
    /// Split a CRLF-separated list into a batch.
    pub fn parse(raw: &str) -> Self {
        Self {
            urls: raw.split(LINE_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// Decode a raw request body.
    pub fn from_body(body: &[u8]) -> Result<Self, BatchError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(BatchError::EmptyBody);
        }

        let mut fields: Map<String, Value> = serde_json::from_slice(body)?;
        let key = if fields.contains_key(URLS_FIELD) {
            Some(URLS_FIELD.to_string())
        } else {
            fields
                .keys()
                .find(|k| k.eq_ignore_ascii_case(URLS_FIELD))
                .cloned()
        };
        let raw: String = match key.and_then(|k| fields.remove(&k)) {
            Some(Value::Null) | None => String::new(),
            Some(value) => serde_json::from_value(value)?,
        };

        let batch = Self::parse(&raw);
        debug!(urls = batch.len(), "Decoded URL batch");
        Ok(batch)
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
