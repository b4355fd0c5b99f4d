// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request generators for limiter and endpoint tests.

use axum::{body::Body, http::Request};
use std::net::{IpAddr, Ipv4Addr};

/// Header carrying the client identity in keyed-limiter tests.
pub const CLIENT_HEADER: &str = "x-forwarded-for";

/// Generate a pool of client addresses used as rate limit keys.
pub fn generate_clients(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// JSON body for `POST /urls` with the given URLs.
pub fn batch_body(urls: &[String]) -> String {
    serde_json::json!({ "urls": urls.join("\r\n") }).to_string()
}

/// `POST /urls` request, optionally tagged with a client identity.
pub fn urls_request(body: impl Into<Body>, client: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/urls")
        .header("content-type", "application/json");
    if let Some(client) = client {
        builder = builder.header(CLIENT_HEADER, client);
    }
    builder.body(body.into()).unwrap()
}

/// Bodies the endpoint must reject as malformed.
pub fn malformed_bodies() -> Vec<&'static str> {
    vec![
        "",
        "   ",
        "{",
        "not json",
        "[1, 2, 3]",
        "{\"urls\": 42}",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_clients() {
        let clients = generate_clients(256);
        assert_eq!(clients.len(), 256);
        let unique: std::collections::HashSet<_> = clients.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_batch_body_uses_crlf() {
        let body = batch_body(&["a".to_string(), "b".to_string()]);
        assert_eq!(body, r#"{"urls":"a\r\nb"}"#);
    }
}
