// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack patterns against the contact endpoint.

/// What each request in an attack carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Valid,
    Bot,
    Invalid,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of unique client addresses
    pub unique_ips: usize,
    /// Send forwarding headers at all
    pub identify_clients: bool,
    /// Body type
    pub payload: PayloadKind,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 50,
            unique_ips: 1,
            identify_clients: true,
            payload: PayloadKind::Valid,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single client flooding the form.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 60,
            ..Default::default()
        }
    }

    /// Many clients, a few submissions each.
    pub fn distributed_attack() -> Self {
        Self {
            total_requests: 200,
            unique_ips: 50,
            ..Default::default()
        }
    }

    /// Bots filling the honeypot from a handful of clients.
    pub fn honeypot_bots() -> Self {
        Self {
            total_requests: 20,
            unique_ips: 4,
            payload: PayloadKind::Bot,
            ..Default::default()
        }
    }

    /// Junk bodies from one client.
    pub fn garbage_flood() -> Self {
        Self {
            total_requests: 30,
            payload: PayloadKind::Invalid,
            ..Default::default()
        }
    }

    /// Requests with no forwarding headers share one bucket.
    pub fn anonymous_flood() -> Self {
        Self {
            total_requests: 20,
            identify_clients: false,
            ..Default::default()
        }
    }
}
