// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transcoder that copies the input stream to the output path.
//!
//! Read errors surface the way the ffmpeg engine reports them, so failure
//! classification can be tested without ffmpeg.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::sync::Mutex;
use tubecast_core::{AudioStream, TrackTags, Transcoder, TubecastError};

/// One recorded `tag_metadata` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCall {
    pub path: PathBuf,
    pub tags: TrackTags,
    pub cover: Option<PathBuf>,
}

#[derive(Default)]
pub struct MockTranscoder {
    converts: AtomicUsize,
    active: AtomicUsize,
    tag_calls: Mutex<Vec<TagCall>>,
    convert_error: Mutex<Option<String>>,
    tag_error: Mutex<Option<String>>,
    busy: Mutex<bool>,
    waits: Mutex<Vec<Duration>>,
}

impl MockTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later `convert` fails with a pipeline error carrying `message`.
    pub async fn fail_convert(&self, message: &str) {
        *self.convert_error.lock().await = Some(message.to_string());
    }

    pub async fn fail_tag(&self, message: &str) {
        *self.tag_error.lock().await = Some(message.to_string());
    }

    /// Behaves like an engine whose admission gate is full.
    pub async fn set_busy(&self, busy: bool) {
        *self.busy.lock().await = busy;
    }

    pub fn convert_count(&self) -> usize {
        self.converts.load(Ordering::SeqCst)
    }

    pub async fn tag_calls(&self) -> Vec<TagCall> {
        self.tag_calls.lock().await.clone()
    }

    /// Wait intervals spent by callers that found the mock busy.
    pub async fn waits(&self) -> Vec<Duration> {
        self.waits.lock().await.clone()
    }

    /// Mirrors the admission gate: wait once if allowed, then recheck.
    async fn check_busy(&self, wait: Option<Duration>) -> Result<(), TubecastError> {
        if !*self.busy.lock().await {
            return Ok(());
        }
        if let Some(wait) = wait {
            self.waits.lock().await.push(wait);
            tokio::time::sleep(wait).await;
            if !*self.busy.lock().await {
                return Ok(());
            }
        }
        Err(TubecastError::ResourceExhausted(
            "max number of ffmpeg processes (0) already running".into(),
        ))
    }
}

fn pipeline(message: impl Into<String>) -> TubecastError {
    TubecastError::pipeline(message)
}

#[async_trait]
impl Transcoder for MockTranscoder {
    async fn convert(
        &self,
        mut input: AudioStream,
        output: &Path,
        wait: Option<Duration>,
    ) -> Result<(), TubecastError> {
        self.check_busy(wait).await?;
        self.converts.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);

        let result = async {
            let mut bytes = Vec::new();
            input
                .read_to_end(&mut bytes)
                .await
                .map_err(|e| pipeline(e.to_string()))?;
            if let Some(message) = self.convert_error.lock().await.clone() {
                return Err(pipeline(message));
            }
            std::fs::write(output, bytes).map_err(|e| pipeline(e.to_string()))
        }
        .await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn tag_metadata(
        &self,
        path: &Path,
        tags: &TrackTags,
        cover: Option<&Path>,
        wait: Option<Duration>,
    ) -> Result<(), TubecastError> {
        self.check_busy(wait).await?;
        self.tag_calls.lock().await.push(TagCall {
            path: path.to_path_buf(),
            tags: tags.clone(),
            cover: cover.map(Path::to_path_buf),
        });
        if let Some(message) = self.tag_error.lock().await.clone() {
            return Err(pipeline(message));
        }
        if !path.is_file() {
            return Err(pipeline(format!("{} does not exist", path.display())));
        }
        Ok(())
    }

    fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}
