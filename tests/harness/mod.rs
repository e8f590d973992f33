// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for the contact intake service.
//!
//! Provides a simulated clock, a recording mail transport, payload and
//! client generators, attack patterns and outcome metrics.

#![allow(dead_code)]

pub mod attacks;
pub mod generators;
pub mod metrics;
pub mod support;
