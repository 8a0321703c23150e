// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion requests: dedup, cache hits, the acquisition pipeline, and
//! failure classification.
//!
//! The coordinator is the only place where failures turn into user-facing
//! text. Everything below it returns typed errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use tubecast_cache::ContentCache;
use tubecast_config::model::TubecastConfig;
use tubecast_core::{
    AudioEntity, AudioPayload, AudioStore, Availability, ChannelId, ChatAction, Media,
    MessageId, MessagingGateway, MetadataProvider, NetworkLoader, TrackTags, Transcoder,
    TubecastError, VideoInfo,
};

use crate::caption::Caption;
use crate::classify::{classify, FailureClass};
use crate::human::{format_date, format_size};
use crate::inflight::InFlightRegistry;

pub const LOOKUP_FAILED: &str = "Invalid video id or failed to get video information";
pub const UNAVAILABLE: &str = "This video is not available for download.";
pub const FAILED: &str = "Failed to convert this video.";
pub const FAILED_BEFORE: &str =
    "Converting this video failed before. It will not be retried.";
pub const BUSY: &str = "Too many conversions are running right now. Try again in a minute.";

/// Tunables taken from the `[delivery]` and `[conversion]` sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub max_upload_bytes: u64,
    pub bytes_per_second_estimate: u64,
    pub wait_timeout: Option<Duration>,
    pub audio_extension: String,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from_config(&TubecastConfig::default())
    }
}

impl CoordinatorSettings {
    pub fn from_config(config: &TubecastConfig) -> Self {
        Self {
            max_upload_bytes: config.delivery.max_upload_bytes,
            bytes_per_second_estimate: config.delivery.bytes_per_second_estimate,
            wait_timeout: config.conversion.wait_timeout_ms.map(Duration::from_millis),
            audio_extension: audio_extension(&config.conversion.container).to_string(),
        }
    }

    pub fn estimate_size(&self, duration_secs: u64) -> u64 {
        duration_secs.saturating_mul(self.bytes_per_second_estimate)
    }
}

/// File extension for an ffmpeg output container.
pub fn audio_extension(container: &str) -> &str {
    match container {
        "ipod" | "mp4" => "m4a",
        "adts" => "aac",
        "matroska" => "mka",
        other => other,
    }
}

/// The collaborators a coordinator drives.
pub struct Collaborators {
    pub gateway: Arc<dyn MessagingGateway>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub loader: Arc<dyn NetworkLoader>,
    pub transcoder: Arc<dyn Transcoder>,
    pub store: Arc<dyn AudioStore>,
}

/// What a conversion request ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Another request from the same channel holds the marker.
    AlreadyRunning { request_id: MessageId },
    Delivered { cached: bool },
    /// A stored non-available record answered the request.
    PreviouslyFailed(Availability),
    LookupFailed,
    TooLarge { bytes: u64 },
    /// Engine at capacity; nothing persisted.
    Busy,
    /// Conversion failed and the classification was persisted.
    Failed(Availability),
}

pub struct Coordinator {
    pub(crate) gateway: Arc<dyn MessagingGateway>,
    metadata: Arc<dyn MetadataProvider>,
    loader: Arc<dyn NetworkLoader>,
    pub(crate) transcoder: Arc<dyn Transcoder>,
    pub(crate) store: Arc<dyn AudioStore>,
    cache: Arc<ContentCache>,
    settings: CoordinatorSettings,
    pub(crate) inflight: InFlightRegistry,
}

impl Coordinator {
    pub fn new(
        collaborators: Collaborators,
        cache: Arc<ContentCache>,
        settings: CoordinatorSettings,
    ) -> Self {
        info!(
            max_upload = %format_size(settings.max_upload_bytes),
            wait_timeout = ?settings.wait_timeout,
            "coordinator initialized"
        );
        Self {
            gateway: collaborators.gateway,
            metadata: collaborators.metadata,
            loader: collaborators.loader,
            transcoder: collaborators.transcoder,
            store: collaborators.store,
            cache,
            settings,
            inflight: InFlightRegistry::new(),
        }
    }

    pub fn inflight(&self) -> &InFlightRegistry {
        &self.inflight
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Serves one conversion request for `external_id` on behalf of `channel`.
    ///
    /// The channel's in-flight marker is held for the whole call and released
    /// on every exit path.
    pub async fn handle_conversion_request(
        &self,
        channel: &ChannelId,
        request_id: &MessageId,
        external_id: &str,
    ) -> Result<Outcome, TubecastError> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(TubecastError::Input("empty video id".into()));
        }

        let _marker = match self.inflight.try_acquire(channel, request_id) {
            Ok(guard) => guard,
            Err(running) => {
                info!(channel = %channel, running = %running, "conversion already running");
                self.gateway
                    .send_message(
                        channel,
                        "A conversion is already running for this chat, please wait.",
                        Some(&running),
                    )
                    .await?;
                return Ok(Outcome::AlreadyRunning { request_id: running });
            }
        };

        match self.store.find(external_id).await? {
            Some(audio) => {
                self.deliver_stored(channel, request_id, external_id, &audio)
                    .await
            }
            None => self.acquire(channel, request_id, external_id).await,
        }
    }

    async fn deliver_stored(
        &self,
        channel: &ChannelId,
        request_id: &MessageId,
        external_id: &str,
        audio: &AudioEntity,
    ) -> Result<Outcome, TubecastError> {
        if audio.availability != Availability::Available {
            debug!(video_id = external_id, availability = %audio.availability, "stored failure");
            let text = match audio.availability {
                Availability::Unavailable => UNAVAILABLE,
                _ => FAILED_BEFORE,
            };
            self.gateway
                .send_message(channel, text, Some(request_id))
                .await?;
            return Ok(Outcome::PreviouslyFailed(audio.availability));
        }

        info!(video_id = external_id, channel = %channel, "serving from store");
        let caption = Caption::for_stored(audio).render();
        let has_photo = !audio.thumb_ref.is_empty();
        if has_photo {
            self.gateway
                .send_photo(
                    channel,
                    Media::Reference(audio.thumb_ref.clone()),
                    Some(caption.as_str()),
                    Some(request_id),
                )
                .await?;
        }
        let payload = AudioPayload {
            media: Media::Reference(audio.file_ref.clone()),
            title: audio.title.clone(),
            performer: audio.channel.clone(),
            duration_secs: audio.duration_secs,
            thumbnail: None,
        };
        let audio_caption = (!has_photo).then_some(caption.as_str());
        self.gateway
            .send_audio(channel, payload, audio_caption, Some(request_id))
            .await?;
        Ok(Outcome::Delivered { cached: true })
    }

    async fn acquire(
        &self,
        channel: &ChannelId,
        request_id: &MessageId,
        external_id: &str,
    ) -> Result<Outcome, TubecastError> {
        let info = match self.metadata.get_video_info(external_id).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                info!(video_id = external_id, "video not found");
                return self.lookup_failed(channel, request_id).await;
            }
            Err(e) => {
                warn!(video_id = external_id, error = %e, "video lookup failed");
                return self.lookup_failed(channel, request_id).await;
            }
        };

        let estimated = self.settings.estimate_size(info.duration_secs);
        if estimated > self.settings.max_upload_bytes {
            info!(video_id = external_id, estimated, "rejected by size gate");
            self.reply_too_large(channel, request_id, estimated).await?;
            return Ok(Outcome::TooLarge { bytes: estimated });
        }

        let mut scratch = ScratchFiles::new(self.cache.clone());
        let caption = Caption::for_video(&info, estimated).render();

        self.indicate(channel, ChatAction::UploadPhoto).await;
        let thumbnail = self.fetch_thumbnail(&info, &mut scratch).await;
        let photo_ref = match &thumbnail {
            Some(path) => {
                self.gateway
                    .send_photo(
                        channel,
                        Media::Upload(path.clone()),
                        Some(caption.as_str()),
                        Some(request_id),
                    )
                    .await?
                    .photo_ref
            }
            None => None,
        };

        self.indicate(channel, ChatAction::UploadAudio).await;
        let audio_path = scratch.track(self.cache.allocate(&self.settings.audio_extension)?);
        let tags = TrackTags {
            artist: info.channel_title.clone(),
            title: info.title.clone(),
            date: info.published_at.as_ref().map(format_date),
        };
        if let Err(e) = self
            .convert_and_tag(external_id, &audio_path, &tags, thumbnail.as_deref())
            .await
        {
            return self
                .record_failure(channel, request_id, &info, estimated, e)
                .await;
        }

        let size = tokio::fs::metadata(&audio_path)
            .await
            .map(|meta| meta.len())
            .map_err(|e| TubecastError::Pipeline {
                message: format!("converted file is missing: {e}"),
                source: Some(Box::new(e)),
            })?;
        if size > self.settings.max_upload_bytes {
            info!(video_id = external_id, size, "converted file exceeds upload limit");
            self.reply_too_large(channel, request_id, size).await?;
            return Ok(Outcome::TooLarge { bytes: size });
        }

        let payload = AudioPayload {
            media: Media::Upload(audio_path.clone()),
            title: info.title.clone(),
            performer: info.channel_title.clone(),
            duration_secs: info.duration_secs,
            thumbnail: thumbnail.clone(),
        };
        let audio_caption = photo_ref.is_none().then_some(caption.as_str());
        let sent = self
            .gateway
            .send_audio(channel, payload, audio_caption, Some(request_id))
            .await?;
        let file_ref = sent.audio_ref.ok_or_else(|| TubecastError::External {
            service: "gateway",
            message: "audio upload returned no file reference".into(),
            source: None,
        })?;

        let entity = AudioEntity {
            title: info.title.clone(),
            channel: info.channel_title.clone(),
            duration_secs: info.duration_secs,
            size_bytes: size,
            thumb_ref: photo_ref.unwrap_or_default(),
            file_ref,
            availability: Availability::Available,
        };
        self.store.set(external_id, &entity).await?;
        info!(video_id = external_id, size, "conversion delivered");
        Ok(Outcome::Delivered { cached: false })
    }

    async fn convert_and_tag(
        &self,
        external_id: &str,
        output: &Path,
        tags: &TrackTags,
        cover: Option<&Path>,
    ) -> Result<(), TubecastError> {
        let wait = self.settings.wait_timeout;
        let stream = self.metadata.get_audio_stream(external_id).await?;
        self.transcoder.convert(stream, output, wait).await?;
        self.transcoder
            .tag_metadata(output, tags, cover, wait)
            .await
    }

    async fn record_failure(
        &self,
        channel: &ChannelId,
        request_id: &MessageId,
        info: &VideoInfo,
        estimated: u64,
        error: TubecastError,
    ) -> Result<Outcome, TubecastError> {
        let class = classify(&error);
        let availability = match class {
            FailureClass::Busy => {
                warn!(video_id = %info.id, error = %error, "conversion refused, engine busy");
                self.gateway
                    .send_message(channel, BUSY, Some(request_id))
                    .await?;
                return Ok(Outcome::Busy);
            }
            FailureClass::Unavailable => Availability::Unavailable,
            FailureClass::Unknown => Availability::UnknownFailure,
        };
        warn!(
            video_id = %info.id,
            error = %error,
            availability = %availability,
            "conversion failed"
        );

        let entity = AudioEntity {
            title: info.title.clone(),
            channel: info.channel_title.clone(),
            duration_secs: info.duration_secs,
            size_bytes: estimated,
            thumb_ref: String::new(),
            file_ref: String::new(),
            availability,
        };
        self.store.set(&info.id, &entity).await?;

        let text = match availability {
            Availability::Unavailable => UNAVAILABLE,
            _ => FAILED,
        };
        self.gateway
            .send_message(channel, text, Some(request_id))
            .await?;
        Ok(Outcome::Failed(availability))
    }

    /// Loads the best thumbnail into the cache. A missing cover is not fatal.
    async fn fetch_thumbnail(
        &self,
        info: &VideoInfo,
        scratch: &mut ScratchFiles,
    ) -> Option<PathBuf> {
        let Some(thumbnail) = info.best_thumbnail() else {
            warn!(video_id = %info.id, "video has no thumbnail");
            return None;
        };
        let loaded = match self.loader.load_file(&thumbnail.url).await {
            Ok(path) => path,
            Err(e) => {
                warn!(video_id = %info.id, error = %e, "thumbnail download failed");
                return None;
            }
        };

        let path = match self.cache.contain(&loaded) {
            Ok(path) => path,
            Err(_) => match self.cache.adopt(&loaded) {
                Ok(path) => path,
                Err(e) => {
                    warn!(path = %loaded.display(), error = %e, "failed to adopt thumbnail");
                    return None;
                }
            },
        };
        let path = scratch.track(path);

        match self.cache.detect_content_type(&path) {
            Ok(mime) if mime.starts_with("image/") => Some(path),
            Ok(mime) => {
                warn!(video_id = %info.id, mime = %mime, "thumbnail is not an image");
                None
            }
            Err(e) => {
                warn!(video_id = %info.id, error = %e, "failed to inspect thumbnail");
                None
            }
        }
    }

    async fn lookup_failed(
        &self,
        channel: &ChannelId,
        request_id: &MessageId,
    ) -> Result<Outcome, TubecastError> {
        self.gateway
            .send_message(channel, LOOKUP_FAILED, Some(request_id))
            .await?;
        Ok(Outcome::LookupFailed)
    }

    async fn reply_too_large(
        &self,
        channel: &ChannelId,
        request_id: &MessageId,
        bytes: u64,
    ) -> Result<(), TubecastError> {
        let text = format!(
            "Audio would be about {}, over the {} upload limit.",
            format_size(bytes),
            format_size(self.settings.max_upload_bytes)
        );
        self.gateway
            .send_message(channel, &text, Some(request_id))
            .await?;
        Ok(())
    }

    /// Best-effort activity indicator.
    async fn indicate(&self, channel: &ChannelId, action: ChatAction) {
        if let Err(e) = self.gateway.send_chat_action(channel, action).await {
            debug!(channel = %channel, error = %e, "failed to send chat action");
        }
    }
}

/// Cache files used by one pipeline run, released when the run ends.
struct ScratchFiles {
    cache: Arc<ContentCache>,
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    fn new(cache: Arc<ContentCache>) -> Self {
        Self {
            cache,
            paths: Vec::new(),
        }
    }

    fn track(&mut self, path: PathBuf) -> PathBuf {
        self.paths.push(path.clone());
        path
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            // Allocated names that were never written have nothing to release.
            if std::fs::symlink_metadata(&path).is_err() {
                continue;
            }
            if let Err(e) = self.cache.release(&path) {
                warn!(path = %path.display(), error = %e, "failed to release cache file");
            }
        }
    }
}
