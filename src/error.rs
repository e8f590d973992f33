// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the contact intake service.
//!
//! Only [`ContactError`] ever reaches a caller. Spam classification and
//! notification failures are absorbed by the handler and surface in logs
//! and metrics alone.

use crate::validator::FieldError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Caller-visible failure of a contact submission.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after: Duration },

    #[error("Malformed request body: {0}")]
    MalformedRequest(String),

    #[error("Invalid form data")]
    ValidationFailed(Vec<FieldError>),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of a single notification dispatch.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid mail configuration: {0}")]
    InvalidConfig(String),

    #[error("Mail dispatch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail API rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

/// Failure of the rate limit backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ContactError {
    fn from(err: StoreError) -> Self {
        ContactError::Internal(err.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            errors: None,
        }
    }
}

/// Public message for the 500 response; the cause stays in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error. Please try again later.";

impl ContactError {
    /// Status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::MalformedRequest(_) | Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metrics label for this error.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::MalformedRequest(_) => "malformed",
            Self::ValidationFailed(_) => "invalid",
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::RateLimited { retry_after } => {
                let retry_secs = retry_after_secs(retry_after);
                (
                    status,
                    [(header::RETRY_AFTER, retry_secs.to_string())],
                    Json(ErrorResponse::new(
                        "Too many requests. Please try again later.",
                    )),
                )
                    .into_response()
            }
            Self::MalformedRequest(_) => {
                (status, Json(ErrorResponse::new("Invalid request body"))).into_response()
            }
            Self::ValidationFailed(errors) => (
                status,
                Json(ErrorResponse {
                    success: false,
                    error: "Invalid form data".to_string(),
                    errors: Some(errors),
                }),
            )
                .into_response(),
            Self::Internal(_) => {
                (status, Json(ErrorResponse::new(INTERNAL_ERROR_MESSAGE))).into_response()
            }
        }
    }
}

/// Whole seconds for a `Retry-After` header, rounded up and never zero.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    let rounded = if retry_after.subsec_nanos() > 0 { secs + 1 } else { secs };
    rounded.max(1)
}
