// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock network loader that writes files outside the cache root.
//!
//! Returned paths live in a private scratch directory, so the coordinator has
//! to adopt them into the cache before use.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tubecast_core::{AdapterType, HealthStatus, NetworkLoader, PluginAdapter, TubecastError};

/// Leading bytes of a PNG file, enough for content sniffing.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

pub struct MockLoader {
    dir: tempfile::TempDir,
    body: Mutex<Vec<u8>>,
    urls: Mutex<Vec<String>>,
    fail: Mutex<bool>,
    counter: AtomicUsize,
}

impl MockLoader {
    pub fn new() -> Result<Self, TubecastError> {
        let dir = tempfile::TempDir::new().map_err(|e| TubecastError::Pipeline {
            message: format!("failed to create loader scratch dir: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(Self {
            dir,
            body: Mutex::new(PNG_BYTES.to_vec()),
            urls: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
            counter: AtomicUsize::new(0),
        })
    }

    /// Replaces what every later download contains.
    pub async fn set_body(&self, body: Vec<u8>) {
        *self.body.lock().await = body;
    }

    pub async fn fail_downloads(&self) {
        *self.fail.lock().await = true;
    }

    pub async fn urls(&self) -> Vec<String> {
        self.urls.lock().await.clone()
    }

    pub fn scratch_dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}

#[async_trait]
impl PluginAdapter for MockLoader {
    fn name(&self) -> &str {
        "mock-loader"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Loader
    }

    async fn health_check(&self) -> Result<HealthStatus, TubecastError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TubecastError> {
        Ok(())
    }
}

#[async_trait]
impl NetworkLoader for MockLoader {
    async fn load_file(&self, url: &str) -> Result<PathBuf, TubecastError> {
        self.urls.lock().await.push(url.to_string());
        if *self.fail.lock().await {
            return Err(TubecastError::External {
                service: "network",
                message: format!("failed to get {url}: status code 404 Not Found"),
                source: None,
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.path().join(format!("download-{n}.jpg"));
        let body = self.body.lock().await.clone();
        std::fs::write(&path, body).map_err(|e| TubecastError::Pipeline {
            message: format!("failed to write {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn downloads_land_in_scratch_dir() {
        let loader = MockLoader::new().unwrap();
        let path = loader.load_file("https://example.com/a.jpg").await.unwrap();
        assert!(path.starts_with(loader.scratch_dir()));
        assert_eq!(std::fs::read(&path).unwrap(), PNG_BYTES);
        assert_eq!(loader.urls().await, vec!["https://example.com/a.jpg"]);
    }

    #[tokio::test]
    async fn failing_downloads() {
        let loader = MockLoader::new().unwrap();
        loader.fail_downloads().await;
        assert!(loader.load_file("https://example.com/a.jpg").await.is_err());
    }
}
