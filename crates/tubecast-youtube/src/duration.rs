// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ISO-8601 durations as used by `contentDetails.duration` (`PT4M13S`).

use thiserror::Error;

/// Why a duration string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("duration `{0}` does not start with `P`")]
    MissingPrefix(String),
    #[error("duration `{input}` has a number without a unit")]
    DanglingNumber { input: String },
    #[error("duration `{input}` has unexpected unit `{unit}`")]
    UnknownUnit { input: String, unit: char },
    #[error("duration `{0}` overflows")]
    Overflow(String),
}

/// Parses `P[nW][nD][T[nH][nM][n[.f]S]]` into whole seconds.
pub fn parse_duration(input: &str) -> Result<u64, DurationError> {
    let body = input
        .strip_prefix('P')
        .ok_or_else(|| DurationError::MissingPrefix(input.to_string()))?;

    let mut total: u64 = 0;
    let mut in_time = false;
    let mut number = String::new();
    let overflow = || DurationError::Overflow(input.to_string());

    for c in body.chars() {
        match c {
            '0'..='9' => number.push(c),
            // Fractional seconds are dropped.
            '.' | ',' if !number.is_empty() => number.push('.'),
            'T' if number.is_empty() => in_time = true,
            unit => {
                if number.is_empty() {
                    return Err(DurationError::DanglingNumber {
                        input: input.to_string(),
                    });
                }
                let whole = number.split('.').next().unwrap_or_default();
                let value: u64 = whole.parse().map_err(|_| overflow())?;
                let scale = match (in_time, unit) {
                    (false, 'W') => 7 * 86_400,
                    (false, 'D') => 86_400,
                    (true, 'H') => 3_600,
                    (true, 'M') => 60,
                    (true, 'S') => 1,
                    _ => {
                        return Err(DurationError::UnknownUnit {
                            input: input.to_string(),
                            unit,
                        });
                    }
                };
                total = value
                    .checked_mul(scale)
                    .and_then(|v| total.checked_add(v))
                    .ok_or_else(overflow)?;
                number.clear();
            }
        }
    }

    if number.is_empty() {
        Ok(total)
    } else {
        Err(DurationError::DanglingNumber {
            input: input.to_string(),
        })
    }
}
