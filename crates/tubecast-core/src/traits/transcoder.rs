// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcoder trait implemented by the bounded ffmpeg engine.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TubecastError;
use crate::types::{AudioStream, TrackTags};

/// Stream-to-file audio conversion behind an admission gate.
///
/// When the gate is full, `wait` (if given) is slept once before a single
/// recheck; callers are never queued.
#[async_trait]
pub trait Transcoder: Send + Sync + 'static {
    /// Converts `input` into an audio-only file at `output`.
    async fn convert(
        &self,
        input: AudioStream,
        output: &Path,
        wait: Option<Duration>,
    ) -> Result<(), TubecastError>;

    /// Rewrites `path` in place with `tags` and an optional embedded cover.
    async fn tag_metadata(
        &self,
        path: &Path,
        tags: &TrackTags,
        cover: Option<&Path>,
        wait: Option<Duration>,
    ) -> Result<(), TubecastError>;

    /// Number of conversion processes currently running.
    fn active_count(&self) -> usize;
}
