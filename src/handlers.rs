// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact intake service.
//!
//! A submission runs through a fixed pipeline and stops at the first
//! terminal step:
//!
//! 1. resolve the client key and consult the rate limiter
//! 2. read the body (bounded) and parse it as JSON
//! 3. validate the form fields
//! 4. silently accept honeypot hits without further work
//! 5. notify the operator (best effort)
//! 6. acknowledge

use crate::config::Config;
use crate::error::{ContactError, INTERNAL_ERROR_MESSAGE};
use crate::limiter::{client_key, RateLimitResult, RateLimiter};
use crate::metrics::Metrics;
use crate::notifier::{NotificationMessage, Notifier};
use crate::spam::is_likely_automated;
use crate::validator::ContactValidator;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Acknowledgement returned for accepted submissions.
pub const ACKNOWLEDGEMENT: &str = "Thank you for your message. We'll get back to you soon!";

/// Largest request body read. Anything bigger is a malformed request.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub validator: ContactValidator,
    pub notifier: Notifier,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, limiter: RateLimiter, notifier: Notifier) -> prometheus::Result<Self> {
        Ok(Self {
            limiter,
            validator: ContactValidator::new(),
            notifier,
            metrics: Metrics::new()?,
            config,
        })
    }
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// How an accepted submission was disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Processed and handed to the notifier
    Accepted,
    /// Honeypot hit, dropped without side effects
    Discarded,
}

impl Disposition {
    fn label(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Discarded => "spam",
        }
    }
}

/// Run one submission through the pipeline.
pub async fn process_submission(
    state: &AppState,
    client: &str,
    body: Body,
) -> Result<Disposition, ContactError> {
    if let RateLimitResult::Limited { retry_after } = state.limiter.check(client).await? {
        info!(
            client = %client,
            retry_after_secs = retry_after.as_secs(),
            "Contact submission rate limited"
        );
        return Err(ContactError::RateLimited { retry_after });
    }

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        debug!(client = %client, error = %e, "Unreadable contact submission body");
        ContactError::MalformedRequest(format!("request body unreadable or over {MAX_BODY_BYTES} bytes"))
    })?;

    let input: Value = serde_json::from_slice(&body).map_err(|e| {
        debug!(client = %client, error = %e, "Malformed contact submission body");
        ContactError::MalformedRequest(e.to_string())
    })?;

    let submission = state.validator.validate(&input).map_err(|errors| {
        info!(client = %client, invalid_fields = errors.len(), "Contact submission failed validation");
        ContactError::ValidationFailed(errors)
    })?;

    if is_likely_automated(&submission) {
        info!(client = %client, "Honeypot triggered, discarding submission");
        return Ok(Disposition::Discarded);
    }

    let message = NotificationMessage::new(&submission, client, Utc::now());
    info!(
        client = %client,
        name = %message.name,
        email = %message.email,
        company = ?message.company,
        submitted_at = %message.submitted_at.to_rfc3339(),
        "Contact form submission"
    );
    debug!(client = %client, message = %message.message, "Contact form message body");

    if state.config.notifier.in_background {
        let notifier = state.notifier.clone();
        let metrics = state.metrics.clone();
        tokio::spawn(async move {
            let outcome = notifier.notify(&message).await;
            metrics.record_notification(outcome.label());
        });
    } else {
        let outcome = state.notifier.notify(&message).await;
        state.metrics.record_notification(outcome.label());
    }

    Ok(Disposition::Accepted)
}

/// `POST /contact`
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let client = client_key(&headers);

    match process_submission(&state, &client, body).await {
        Ok(disposition) => {
            state.metrics.record_submission(disposition.label());
            (
                StatusCode::OK,
                Json(SuccessResponse {
                    success: true,
                    message: ACKNOWLEDGEMENT,
                }),
            )
                .into_response()
        }
        Err(err) => {
            if let ContactError::Internal(cause) = &err {
                error!(client = %client, error = %cause, "Contact submission failed");
            }
            state.metrics.record_submission(err.outcome_label());
            err.into_response()
        }
    }
}

/// `GET /contact`
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Map a handler panic to the internal error response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Handler panicked");
    ContactError::Internal(INTERNAL_ERROR_MESSAGE.to_string()).into_response()
}
