// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure classification for conversion and tagging errors.

use std::sync::LazyLock;

use regex::Regex;
use tubecast_core::TubecastError;

/// A 4xx status code standing on its own in a diagnostic message.
static CLIENT_ERROR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)4\d\d(\s|$)").unwrap());

/// How a failed conversion is reported and persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Engine at capacity; nothing is persisted, the user may resend.
    Busy,
    /// The source refused the content. Persisted as `unavailable`.
    Unavailable,
    /// Anything else. Persisted as `unknown-failure`.
    Unknown,
}

pub fn classify(error: &TubecastError) -> FailureClass {
    match error {
        TubecastError::ResourceExhausted(_) => FailureClass::Busy,
        TubecastError::ContentUnavailable { .. } => FailureClass::Unavailable,
        other if CLIENT_ERROR_RE.is_match(&other.to_string()) => FailureClass::Unavailable,
        _ => FailureClass::Unknown,
    }
}
