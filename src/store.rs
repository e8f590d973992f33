// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Backing store for fixed window counters.
//!
//! [`RateLimitStore`] is the seam between the limiter and wherever counters
//! live. A shared cache can implement `hit` as a single atomic script; the
//! in-process [`InMemoryStore`] serves single-instance deployments and tests.

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// State of a key's window after a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    /// Requests counted in the current window
    pub count: u32,
    /// Time until the window resets
    pub reset_in: Duration,
    /// Whether this hit was admitted
    pub allowed: bool,
}

/// Atomic conditional increment with expiry.
pub trait RateLimitStore: Send + Sync + Debug {
    /// Record one request against `key`.
    ///
    /// Starts a fresh window with `count = 1` when the key is unknown or its
    /// window has elapsed, increments while `count < max`, and otherwise
    /// denies without touching the entry.
    fn hit<'a>(&'a self, key: &'a str, max: u32, window: Duration) -> StoreFuture<'a, WindowState>;

    /// Drop entries whose window has elapsed. Returns how many were removed.
    fn sweep(&self) -> StoreFuture<'_, usize>;
}

/// Counter for one client key.
#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    window_reset_at: Instant,
}

/// Process-local store.
#[derive(Debug)]
pub struct InMemoryStore {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a store driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store driven by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of tracked keys.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether no keys are tracked.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn record_hit(&self, key: &str, max: u32, window: Duration) -> Result<WindowState, StoreError> {
        let now = self.clock.now();
        // One lock covers the read-modify-write of the entry.
        let mut entries = self.entries.lock().await;

        // Unknown keys start out expired and are reset below.
        let entry = entries
            .entry(key.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_reset_at: now,
            });

        if now >= entry.window_reset_at {
            let window_reset_at = now.checked_add(window).ok_or_else(|| {
                StoreError::Unavailable(format!("window of {window:?} overflows the clock"))
            })?;
            *entry = RateLimitEntry {
                count: 1,
                window_reset_at,
            };
            debug!(client = %key, "Started rate limit window");
            return Ok(WindowState {
                count: 1,
                reset_in: window,
                allowed: max >= 1,
            });
        }

        let reset_in = entry.window_reset_at.saturating_duration_since(now);
        if entry.count < max {
            entry.count += 1;
            Ok(WindowState {
                count: entry.count,
                reset_in,
                allowed: true,
            })
        } else {
            Ok(WindowState {
                count: entry.count,
                reset_in,
                allowed: false,
            })
        }
    }

    async fn sweep_expired(&self) -> Result<usize, StoreError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| now < entry.window_reset_at);
        Ok(before - entries.len())
    }
}

impl RateLimitStore for InMemoryStore {
    fn hit<'a>(&'a self, key: &'a str, max: u32, window: Duration) -> StoreFuture<'a, WindowState> {
        Box::pin(self.record_hit(key, max, window))
    }

    fn sweep(&self) -> StoreFuture<'_, usize> {
        Box::pin(self.sweep_expired())
    }
}
