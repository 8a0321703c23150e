// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for tubecast.
//!
//! This crate provides the trait definitions, error type and common types
//! shared by every pipeline stage. Adapters (Telegram, YouTube, SQLite,
//! ffmpeg) implement the traits defined here so the coordinator can be
//! exercised against test doubles.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TubecastError;
pub use types::{
    AdapterType, AudioEntity, AudioPayload, AudioStream, Availability, ChannelId, ChatAction,
    HealthStatus, HistoryEntry, InboundMessage, Media, MessageDescriptor, MessageId, Thumbnail,
    TrackTags, VideoInfo,
};

pub use traits::{
    AudioStore, MessagingGateway, MetadataProvider, NetworkLoader, PluginAdapter, Transcoder,
    UpdateSource,
};

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::str::FromStr;

    use super::*;

    fn thumb(url: &str, width: u32) -> Thumbnail {
        Thumbnail {
            url: url.into(),
            width,
            height: width * 9 / 16,
        }
    }

    fn info_with(thumbs: &[(&str, Thumbnail)]) -> VideoInfo {
        VideoInfo {
            id: "dQw4w9WgXcQ".into(),
            title: "title".into(),
            channel_title: "channel".into(),
            published_at: None,
            duration_secs: 212,
            thumbnails: thumbs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn availability_uses_kebab_case_on_disk() {
        assert_eq!(Availability::Available.to_string(), "available");
        assert_eq!(Availability::Unavailable.to_string(), "unavailable");
        assert_eq!(Availability::UnknownFailure.to_string(), "unknown-failure");
        assert_eq!(
            Availability::from_str("unknown-failure").unwrap(),
            Availability::UnknownFailure
        );
        assert!(Availability::from_str("maybe").is_err());
    }

    #[test]
    fn adapter_type_display_parses_back() {
        for variant in [
            AdapterType::Gateway,
            AdapterType::Metadata,
            AdapterType::Loader,
            AdapterType::Transcoder,
            AdapterType::Storage,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn best_thumbnail_prefers_named_quality() {
        let info = info_with(&[
            ("default", thumb("d", 120)),
            ("high", thumb("h", 480)),
            ("standard", thumb("s", 640)),
        ]);
        assert_eq!(info.best_thumbnail().unwrap().url, "s");
    }

    #[test]
    fn best_thumbnail_falls_back_to_widest() {
        let info = info_with(&[("odd", thumb("small", 100)), ("other", thumb("wide", 900))]);
        assert_eq!(info.best_thumbnail().unwrap().url, "wide");
        assert!(info_with(&[]).best_thumbnail().is_none());
    }

    #[test]
    fn track_tags_skip_missing_date() {
        let tags = TrackTags {
            artist: "a".into(),
            title: "t".into(),
            date: None,
        };
        assert_eq!(tags.pairs(), vec![("artist", "a"), ("title", "t")]);

        let dated = TrackTags {
            date: Some("2009-10-25".into()),
            ..tags
        };
        assert_eq!(dated.pairs().last(), Some(&("date", "2009-10-25")));
    }

    #[test]
    fn resource_exhausted_is_detectable() {
        assert!(TubecastError::ResourceExhausted("full".into()).is_resource_exhausted());
        assert!(!TubecastError::pipeline("boom").is_resource_exhausted());
        let err = TubecastError::external("telegram", "send failed", std::io::Error::other("x"));
        assert_eq!(err.to_string(), "telegram error: send failed");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_gateway<T: MessagingGateway>() {}
        fn _assert_updates<T: UpdateSource>() {}
        fn _assert_metadata<T: MetadataProvider>() {}
        fn _assert_loader<T: NetworkLoader>() {}
        fn _assert_transcoder<T: Transcoder>() {}
        fn _assert_store<T: AudioStore>() {}
    }
}
