// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end coordinator tests.
//!
//! `TestHarness` wires a [`Coordinator`] to mock collaborators, a temp cache
//! root, and a temp SQLite database.

use std::sync::Arc;
use std::time::Duration;

use tubecast_cache::ContentCache;
use tubecast_config::model::StorageConfig;
use tubecast_core::{AudioStore, ChannelId, MessageId, TubecastError, VideoInfo};
use tubecast_coordinator::{Collaborators, Coordinator, CoordinatorSettings, Outcome};
use tubecast_storage::SqliteStore;

use crate::mock_gateway::MockGateway;
use crate::mock_loader::MockLoader;
use crate::mock_metadata::MockMetadata;
use crate::mock_transcoder::MockTranscoder;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    videos: Vec<VideoInfo>,
    settings: CoordinatorSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            videos: Vec::new(),
            settings: CoordinatorSettings::default(),
        }
    }

    /// Registers a video with the mock metadata provider.
    pub fn with_video(mut self, info: VideoInfo) -> Self {
        self.videos.push(info);
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.settings.max_upload_bytes = bytes;
        self
    }

    pub fn with_wait_timeout(mut self, wait: Duration) -> Self {
        self.settings.wait_timeout = Some(wait);
        self
    }

    pub async fn build(self) -> Result<TestHarness, TubecastError> {
        let temp_dir = tempfile::TempDir::new().map_err(TubecastError::storage)?;

        let db_path = temp_dir.path().join("test.db");
        let store = SqliteStore::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        store.initialize().await?;
        let store = Arc::new(store);

        let cache = Arc::new(ContentCache::open(temp_dir.path().join("cache"))?);
        let gateway = Arc::new(MockGateway::new());
        let metadata = Arc::new(MockMetadata::new());
        for video in self.videos {
            metadata.add_video(video).await;
        }
        let loader = Arc::new(MockLoader::new()?);
        let transcoder = Arc::new(MockTranscoder::new());

        let coordinator = Arc::new(Coordinator::new(
            Collaborators {
                gateway: gateway.clone(),
                metadata: metadata.clone(),
                loader: loader.clone(),
                transcoder: transcoder.clone(),
                store: store.clone(),
            },
            cache.clone(),
            self.settings,
        ));

        Ok(TestHarness {
            coordinator,
            gateway,
            metadata,
            loader,
            transcoder,
            store,
            cache,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired coordinator with mock collaborators.
pub struct TestHarness {
    pub coordinator: Arc<Coordinator>,
    pub gateway: Arc<MockGateway>,
    pub metadata: Arc<MockMetadata>,
    pub loader: Arc<MockLoader>,
    pub transcoder: Arc<MockTranscoder>,
    pub store: Arc<SqliteStore>,
    pub cache: Arc<ContentCache>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Runs a conversion request for `id` from `channel`.
    pub async fn request(
        &self,
        channel: &str,
        request_id: &str,
        id: &str,
    ) -> Result<Outcome, TubecastError> {
        self.coordinator
            .handle_conversion_request(
                &ChannelId(channel.to_string()),
                &MessageId(request_id.to_string()),
                id,
            )
            .await
    }

    /// Number of files left under the cache root.
    pub fn cache_file_count(&self) -> usize {
        std::fs::read_dir(self.cache.root())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
