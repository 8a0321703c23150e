// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content cache and network loader for tubecast.

pub mod cache;
pub mod loader;

pub use cache::{extension_of, ContentCache, FALLBACK_EXTENSION};
pub use loader::{HttpLoader, DEFAULT_MAX_REDIRECTS};
