// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network loader trait for fetching remote files into the cache.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::TubecastError;
use crate::traits::adapter::PluginAdapter;

/// Downloads a URL into a freshly allocated cache file.
#[async_trait]
pub trait NetworkLoader: PluginAdapter {
    /// Fetches `url`, following a bounded number of redirects, and returns
    /// the cache-managed local path. The caller owns the returned file.
    async fn load_file(&self, url: &str) -> Result<PathBuf, TubecastError>;
}
