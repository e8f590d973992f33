// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HeadVantage Contact Intake
//!
//! This crate provides the backend for the website contact form:
//!
//! - Fixed window rate limiting per client key (5 per 15 minutes default)
//! - Field validation with every violation reported
//! - Honeypot spam filtering with a silent success response
//! - Best-effort operator email with a dispatch timeout
//!
//! The only caller-visible outcomes are success, rate limited, malformed
//! request, validation failure and internal error.

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod notifier;
pub mod spam;
pub mod store;
pub mod validator;

pub use config::Config;
pub use error::ContactError;
pub use handlers::AppState;
pub use limiter::{RateLimitResult, RateLimiter};
pub use notifier::{MailTransport, Notifier};
pub use store::{InMemoryStore, RateLimitStore};
pub use validator::{ContactValidator, Submission};

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Build the service router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/healthz", get(handlers::health))
        .route(
            "/contact",
            post(handlers::submit_contact).get(handlers::method_not_allowed),
        )
        .route(
            "/api/contact",
            post(handlers::submit_contact).get(handlers::method_not_allowed),
        );

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(handlers::metrics));
    }

    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        );
    }

    app.layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
