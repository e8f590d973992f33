// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators.

use serde_json::json;
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client addresses.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// A clean submission body.
pub fn valid_payload(i: usize) -> String {
    json!({
        "name": format!("Visitor {i}"),
        "email": format!("visitor{i}@example.com"),
        "company": "Acme Vision",
        "message": format!("Hello, I'd like a demo of the platform. Ref {i}.")
    })
    .to_string()
}

/// A valid submission with the honeypot filled in.
pub fn bot_payload(i: usize) -> String {
    json!({
        "name": format!("Bot {i}"),
        "email": format!("bot{i}@spam.example"),
        "message": "Buy cheap followers now, limited offer!!!",
        "_hp": "http://spam.example"
    })
    .to_string()
}

/// Bodies that fail validation or parsing.
pub fn invalid_payloads() -> Vec<String> {
    vec![
        json!({"name": "A", "email": "a@b.com", "message": "short"}).to_string(),
        json!({"name": "Alice", "email": "nope", "message": "Hello there, interested!"})
            .to_string(),
        json!({}).to_string(),
        json!([]).to_string(),
        json!({"name": 1, "email": true, "message": null}).to_string(),
        "{\"name\": \"unterminated".to_string(),
        String::new(),
    ]
}
