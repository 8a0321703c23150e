// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock metadata provider with scripted videos and audio streams.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::stream;
use tokio::sync::Mutex;
use tokio_util::io::StreamReader;
use tubecast_core::{
    AdapterType, AudioStream, HealthStatus, MetadataProvider, PluginAdapter, Thumbnail,
    TubecastError, VideoInfo,
};

/// How the audio stream for an id behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamScript {
    /// Yields these bytes, then ends cleanly.
    Bytes(Vec<u8>),
    /// Yields these bytes, then fails with `message`.
    FailAfter { bytes: Vec<u8>, message: String },
}

pub struct MockMetadata {
    videos: Arc<Mutex<HashMap<String, VideoInfo>>>,
    streams: Arc<Mutex<HashMap<String, StreamScript>>>,
    lookup_error: Arc<Mutex<Option<String>>>,
    lookups: AtomicUsize,
    streams_opened: AtomicUsize,
}

impl MockMetadata {
    pub fn new() -> Self {
        Self {
            videos: Arc::new(Mutex::new(HashMap::new())),
            streams: Arc::new(Mutex::new(HashMap::new())),
            lookup_error: Arc::new(Mutex::new(None)),
            lookups: AtomicUsize::new(0),
            streams_opened: AtomicUsize::new(0),
        }
    }

    pub async fn add_video(&self, info: VideoInfo) {
        self.videos.lock().await.insert(info.id.clone(), info);
    }

    pub async fn set_stream(&self, id: &str, script: StreamScript) {
        self.streams.lock().await.insert(id.to_string(), script);
    }

    /// Makes every lookup fail with an external-service error.
    pub async fn fail_lookups(&self, message: &str) {
        *self.lookup_error.lock().await = Some(message.to_string());
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn stream_count(&self) -> usize {
        self.streams_opened.load(Ordering::SeqCst)
    }
}

impl Default for MockMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A video with one `high` thumbnail published on 2021-06-01.
pub fn sample_video(id: &str, duration_secs: u64) -> VideoInfo {
    let mut thumbnails = BTreeMap::new();
    thumbnails.insert(
        "high".to_string(),
        Thumbnail {
            url: format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"),
            width: 480,
            height: 360,
        },
    );
    VideoInfo {
        id: id.to_string(),
        title: format!("Title of {id}"),
        channel_title: "Some Channel".to_string(),
        published_at: Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).single(),
        duration_secs,
        thumbnails,
    }
}

#[async_trait]
impl PluginAdapter for MockMetadata {
    fn name(&self) -> &str {
        "mock-metadata"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Metadata
    }

    async fn health_check(&self) -> Result<HealthStatus, TubecastError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TubecastError> {
        Ok(())
    }
}

#[async_trait]
impl MetadataProvider for MockMetadata {
    async fn get_video_info(&self, id: &str) -> Result<Option<VideoInfo>, TubecastError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.lookup_error.lock().await.clone() {
            return Err(TubecastError::External {
                service: "youtube",
                message,
                source: None,
            });
        }
        Ok(self.videos.lock().await.get(id).cloned())
    }

    async fn get_audio_stream(&self, id: &str) -> Result<AudioStream, TubecastError> {
        self.streams_opened.fetch_add(1, Ordering::SeqCst);
        let script = self
            .streams
            .lock()
            .await
            .get(id)
            .cloned()
            .unwrap_or_else(|| StreamScript::Bytes(format!("audio of {id}").into_bytes()));
        Ok(match script {
            StreamScript::Bytes(bytes) => chunks_then(bytes, None),
            StreamScript::FailAfter { bytes, message } => {
                chunks_then(bytes, Some(io::Error::other(message)))
            }
        })
    }
}

/// A reader over `bytes` that optionally ends with `error`.
fn chunks_then(bytes: Vec<u8>, error: Option<io::Error>) -> AudioStream {
    let mut items: Vec<io::Result<io::Cursor<Vec<u8>>>> = vec![Ok(io::Cursor::new(bytes))];
    if let Some(error) = error {
        items.push(Err(error));
    }
    Box::pin(StreamReader::new(stream::iter(items)))
}
