// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for attack simulation.

use axum::http::StatusCode;
use std::collections::HashMap;
use std::fmt;

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accepted,
    RateLimited,
    BadRequest,
    Internal,
    Other,
}

impl From<StatusCode> for Outcome {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Outcome::Accepted,
            StatusCode::TOO_MANY_REQUESTS => Outcome::RateLimited,
            StatusCode::BAD_REQUEST => Outcome::BadRequest,
            StatusCode::INTERNAL_SERVER_ERROR => Outcome::Internal,
            _ => Outcome::Other,
        }
    }
}

/// Collects outcomes during an attack.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    outcomes: HashMap<Outcome, usize>,
    requests_per_client: HashMap<String, usize>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome, client: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_client.entry(client.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn unique_clients(&self) -> usize {
        self.requests_per_client.len()
    }

    /// Fraction of requests that were rate limited.
    pub fn block_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.count(Outcome::RateLimited) as f64 / self.total() as f64
        }
    }
}

impl fmt::Display for AttackMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "requests: {}", self.total())?;
        writeln!(f, "clients: {}", self.unique_clients())?;
        writeln!(f, "accepted: {}", self.count(Outcome::Accepted))?;
        writeln!(f, "rate limited: {}", self.count(Outcome::RateLimited))?;
        writeln!(f, "bad request: {}", self.count(Outcome::BadRequest))?;
        write!(f, "block rate: {:.2}", self.block_rate())
    }
}
