// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed window rate limiter for contact submissions.
//!
//! Each client key gets at most `max_requests` submissions per window
//! (5 per 15 minutes by default). This is abuse friction, not a security
//! control: the counters live in whatever [`RateLimitStore`] is plugged in,
//! and a client that rotates its forwarded address gets a fresh window.

use crate::config::RateLimitConfig;
use crate::error::StoreError;
use crate::store::{InMemoryStore, RateLimitStore};
use axum::http::HeaderMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Key shared by every request that carries no forwarding header.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Headers consulted for the client key, in order.
const CLIENT_HEADERS: [&str; 2] = ["x-forwarded-for", "x-real-ip"];

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Rate limiter over a pluggable counter store.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    /// Create a limiter backed by an in-process store.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }

    /// Create a limiter backed by the given store.
    pub fn with_store(config: RateLimitConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self { config, store }
    }

    /// Count one request for `client_key` and report whether it may proceed.
    pub async fn check(&self, client_key: &str) -> Result<RateLimitResult, StoreError> {
        let state = self
            .store
            .hit(
                client_key,
                self.config.max_requests,
                self.config.window_duration(),
            )
            .await?;

        if state.allowed {
            Ok(RateLimitResult::Allowed {
                remaining: self.config.max_requests.saturating_sub(state.count),
                reset_in: state.reset_in,
            })
        } else {
            debug!(client = %client_key, retry_after = ?state.reset_in, "Client rate limit exceeded");
            Ok(RateLimitResult::Limited {
                retry_after: state.reset_in,
            })
        }
    }

    /// Boolean form of [`check`](Self::check).
    pub async fn allow(&self, client_key: &str) -> Result<bool, StoreError> {
        Ok(self.check(client_key).await?.is_allowed())
    }

    /// Clean up expired entries (should be called periodically).
    pub async fn cleanup(&self) -> Result<usize, StoreError> {
        let removed = self.store.sweep().await?;
        if removed > 0 {
            debug!(removed, "Swept expired rate limit windows");
        }
        Ok(removed)
    }
}

/// Resolve the rate limit key for a request.
///
/// Uses the first hop of `X-Forwarded-For`, then `X-Real-IP`, and falls back
/// to [`UNKNOWN_CLIENT`], which puts all unidentified clients in one bucket.
pub fn client_key(headers: &HeaderMap) -> String {
    CLIENT_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
