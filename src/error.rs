// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types surfaced at the HTTP boundary.

use crate::batch::BatchError;
use crate::digest::FetchError;
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("Error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Sorry, method {0} not supported")]
    MethodNotSupported(Method),

    #[error("404 page not found")]
    NotFound,

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Batch(_) | Self::Fetch(_) | Self::MethodNotSupported(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
