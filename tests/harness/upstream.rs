// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Local HTTP origin serving fixed bodies and error statuses.

use axum::{extract::Path, http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// A running upstream bound to an ephemeral loopback port.
pub struct Upstream {
    pub addr: SocketAddr,
}

impl Upstream {
    /// Serve:
    /// - `/page/:id` → 200 with [`page_body`]
    /// - `/missing` → 404
    /// - `/error` → 500
    pub async fn spawn() -> Self {
        let app = Router::new()
            .route("/page/:id", get(|Path(id): Path<String>| async move { page_body(&id) }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/error",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn page(&self, id: &str) -> String {
        self.url(&format!("/page/{}", id))
    }
}

/// Body served for `/page/:id`.
pub fn page_body(id: &str) -> String {
    format!("<html><body>page {}</body></html>", id)
}

/// URL of a loopback port with nothing listening on it.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

/// Client that never routes loopback traffic through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
