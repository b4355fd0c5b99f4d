// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fetch-and-hash pipeline.
//!
//! URLs are fetched strictly in input order. A transport failure aborts
//! the whole batch; a non-200 response only drops that URL. There is no
//! per-URL timeout, so a slow upstream holds up the rest of the batch
//! until the server-wide request deadline fires.

use crate::batch::LINE_SEPARATOR;
use reqwest::StatusCode;
use sha1::{Digest, Sha1};
use thiserror::Error;
use tracing::debug;

/// Errors that abort a batch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Hex-encoded SHA-1 of `bytes`.
pub fn digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digests of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestReport {
    pub digests: Vec<String>,
    /// URLs skipped because they did not answer 200
    pub omitted: usize,
}

impl DigestReport {
    /// Digests joined by CRLF, without a trailing separator.
    pub fn joined(&self) -> String {
        self.digests.join(LINE_SEPARATOR)
    }
}

/// Fetches each URL of a batch and hashes the 200 responses.
#[derive(Clone)]
pub struct DigestPipeline {
    client: reqwest::Client,
}

impl DigestPipeline {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn run(&self, urls: &[String]) -> Result<DigestReport, FetchError> {
        let mut report = DigestReport {
            digests: Vec::with_capacity(urls.len()),
            omitted: 0,
        };

        for url in urls {
            let response = self
                .client
                .get(url.as_str())
                .send()
                .await
                .map_err(FetchError::Request)?;

            let status = response.status();
            if status != StatusCode::OK {
                debug!(url = %url, status = %status, "Omitting non-200 response");
                report.omitted += 1;
                continue;
            }

            let body = response.bytes().await.map_err(|source| FetchError::Body {
                url: url.clone(),
                source,
            })?;
            report.digests.push(digest_hex(&body));
        }

        Ok(report)
    }
}
