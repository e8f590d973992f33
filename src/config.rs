// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact intake service.
//!
//! Every value has a default so the service starts with no environment at
//! all; the only behavioural switch that matters in practice is the mail
//! credential, whose absence disables outbound notification.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Configuration for the contact intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Outbound notification configuration
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Origins allowed to post the form cross-site. Empty disables CORS.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// Fixed window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per window per client key (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 900)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Interval between sweeps of expired windows in seconds (default: 60)
    #[serde(default = "default_sweep_secs")]
    pub sweep_interval_secs: u64,
}

/// Mail notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Mail API credential. `None` disables notification.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Mail API endpoint
    #[serde(default = "default_mail_api_url")]
    pub api_url: String,

    /// Sender address
    #[serde(default = "default_mail_from")]
    pub from: String,

    /// Operator destination address
    #[serde(default = "default_mail_to")]
    pub to: String,

    /// Backstop for a single dispatch in milliseconds (default: 10000)
    #[serde(default = "default_mail_timeout_ms")]
    pub timeout_ms: u64,

    /// Dispatch on a spawned task instead of awaiting it in the request
    #[serde(default)]
    pub in_background: bool,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    15 * 60
}

/// Longest accepted rate limit window (one week).
pub const MAX_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

fn default_sweep_secs() -> u64 {
    60
}

fn default_mail_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_mail_from() -> String {
    "HeadVantage Website <noreply@headvantage.com>".to_string()
}

fn default_mail_to() -> String {
    "contact@headvantage.com".to_string()
}

fn default_mail_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rate_limit: RateLimitConfig::default(),
            notifier: NotifierConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            sweep_interval_secs: default_sweep_secs(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_mail_api_url(),
            from: default_mail_from(),
            to: default_mail_to(),
            timeout_ms: default_mail_timeout_ms(),
            in_background: false,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl NotifierConfig {
    /// Get the dispatch timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether a usable credential is configured.
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let server = ServerConfig {
            bind_addr: var("BIND_ADDR").unwrap_or_else(default_bind_addr),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };

        let rate_limit = RateLimitConfig {
            max_requests: parse_or("RATE_LIMIT_MAX_REQUESTS", var("RATE_LIMIT_MAX_REQUESTS"), default_max_requests()),
            window_secs: cap_window(parse_or(
                "RATE_LIMIT_WINDOW_SECS",
                var("RATE_LIMIT_WINDOW_SECS"),
                default_window_secs(),
            )),
            sweep_interval_secs: parse_or("RATE_LIMIT_SWEEP_SECS", var("RATE_LIMIT_SWEEP_SECS"), default_sweep_secs()),
        };

        let notifier = NotifierConfig {
            api_key: var("MAIL_API_KEY"),
            api_url: var("MAIL_API_URL").unwrap_or_else(default_mail_api_url),
            from: var("MAIL_FROM").unwrap_or_else(default_mail_from),
            to: var("MAIL_TO").unwrap_or_else(default_mail_to),
            timeout_ms: parse_or("MAIL_TIMEOUT_MS", var("MAIL_TIMEOUT_MS"), default_mail_timeout_ms()),
            in_background: parse_or("NOTIFY_IN_BACKGROUND", var("NOTIFY_IN_BACKGROUND"), false),
        };

        let metrics = MetricsConfig {
            enabled: parse_or("METRICS_ENABLED", var("METRICS_ENABLED"), default_true()),
            ..Default::default()
        };

        Self {
            server,
            rate_limit,
            notifier,
            metrics,
        }
    }
}

/// Parse a variable, keeping the default when it is absent or malformed.
fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(variable = name, value = %raw, "Ignoring malformed configuration value");
                default
            }
        },
    }
}

fn cap_window(secs: u64) -> u64 {
    if secs > MAX_WINDOW_SECS {
        warn!(
            variable = "RATE_LIMIT_WINDOW_SECS",
            value = secs,
            max = MAX_WINDOW_SECS,
            "Capping rate limit window"
        );
        MAX_WINDOW_SECS
    } else {
        secs
    }
}
