// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across adapter traits and the conversion pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::io::AsyncRead;

/// Identifier of the conversation a request came from (a Telegram chat id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// Identifier of a message within a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays in the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Gateway,
    Metadata,
    Loader,
    Transcoder,
    Storage,
}

/// Persisted classification of whether an id's content can be delivered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    Available,
    Unavailable,
    UnknownFailure,
}

/// The delivered (or refused) result for one external id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioEntity {
    pub title: String,
    /// Name of the source channel (the uploader), not the requester.
    pub channel: String,
    pub duration_secs: u64,
    /// Actual byte size for delivered audio, the estimate otherwise.
    pub size_bytes: u64,
    /// Gateway reference of the uploaded thumbnail; empty when none exists.
    pub thumb_ref: String,
    /// Gateway reference of the uploaded audio; empty unless available.
    pub file_ref: String,
    pub availability: Availability,
}

/// One row of the append-only history joined to its current entity state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub seq: i64,
    pub video_id: String,
    pub audio: AudioEntity,
}

/// A thumbnail variant advertised by the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Source metadata for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub duration_secs: u64,
    /// Thumbnails keyed by quality name (`default`, `high`, `maxres`, ...).
    pub thumbnails: BTreeMap<String, Thumbnail>,
}

/// Quality names in preference order.
const THUMBNAIL_PREFERENCE: [&str; 5] = ["maxres", "standard", "high", "medium", "default"];

impl VideoInfo {
    /// Picks the best thumbnail: named qualities first, then the widest one.
    pub fn best_thumbnail(&self) -> Option<&Thumbnail> {
        THUMBNAIL_PREFERENCE
            .iter()
            .find_map(|quality| self.thumbnails.get(*quality))
            .or_else(|| self.thumbnails.values().max_by_key(|t| t.width))
    }
}

/// A lazily produced audio byte stream. Finite, not restartable.
pub type AudioStream = Pin<Box<dyn AsyncRead + Send>>;

/// Tags written into the finished audio container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub artist: String,
    pub title: String,
    /// Release date as `YYYY-MM-DD`.
    pub date: Option<String>,
}

impl TrackTags {
    /// Key/value pairs in the order they are handed to the transcoder.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("artist", self.artist.as_str()), ("title", self.title.as_str())];
        if let Some(date) = &self.date {
            pairs.push(("date", date.as_str()));
        }
        pairs
    }
}

/// Media handed to the gateway: either a local file or an earlier upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Media {
    Upload(PathBuf),
    Reference(String),
}

/// Audio message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub media: Media,
    pub title: String,
    pub performer: String,
    pub duration_secs: u64,
    /// Inline thumbnail; the gateway only accepts fresh uploads here.
    pub thumbnail: Option<PathBuf>,
}

/// Ephemeral status shown to the requester while work is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    UploadAudio,
}

/// What the gateway reports back for a sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub message_id: MessageId,
    /// Reusable reference of the largest uploaded photo, if any.
    pub photo_ref: Option<String>,
    /// Reusable reference of the uploaded audio, if any.
    pub audio_ref: Option<String>,
}

/// A text message received from a requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub channel: ChannelId,
    pub message_id: MessageId,
    pub sender_id: Option<String>,
    pub text: String,
}
