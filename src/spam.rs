// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Honeypot spam check.
//!
//! The rendered form carries a hidden `_hp` input that people never see or
//! tab into. Anything that fills it in is treated as automated.

use crate::validator::Submission;

/// Whether a validated submission looks automated.
pub fn is_likely_automated(submission: &Submission) -> bool {
    submission
        .honeypot
        .as_deref()
        .is_some_and(|value| !value.is_empty())
}
