// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metadata provider trait for the media source.

use async_trait::async_trait;

use crate::error::TubecastError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AudioStream, VideoInfo};

/// Looks up source metadata and opens audio streams.
#[async_trait]
pub trait MetadataProvider: PluginAdapter {
    /// Returns `None` when the id does not resolve to a video.
    async fn get_video_info(&self, id: &str) -> Result<Option<VideoInfo>, TubecastError>;

    /// Opens the audio stream for `id`. Errors while reading the stream surface
    /// from the stream itself.
    async fn get_audio_stream(&self, id: &str) -> Result<AudioStream, TubecastError>;
}
