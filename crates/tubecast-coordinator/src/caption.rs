// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Captions attached to delivered thumbnails and audio.

use chrono::{DateTime, Utc};
use tubecast_core::{AudioEntity, VideoInfo};

use crate::human::{format_date, format_duration, format_size};

/// Size shown in a caption: estimated before conversion, measured after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeNote {
    Estimated(u64),
    Actual(u64),
}

#[derive(Debug, Clone)]
pub struct Caption<'a> {
    pub title: &'a str,
    pub channel: &'a str,
    pub duration_secs: u64,
    pub size: SizeNote,
    pub published: Option<&'a DateTime<Utc>>,
}

impl<'a> Caption<'a> {
    pub fn for_video(info: &'a VideoInfo, estimated_bytes: u64) -> Self {
        Self {
            title: &info.title,
            channel: &info.channel_title,
            duration_secs: info.duration_secs,
            size: SizeNote::Estimated(estimated_bytes),
            published: info.published_at.as_ref(),
        }
    }

    /// Stored entities carry no publish date.
    pub fn for_stored(audio: &'a AudioEntity) -> Self {
        Self {
            title: &audio.title,
            channel: &audio.channel,
            duration_secs: audio.duration_secs,
            size: SizeNote::Actual(audio.size_bytes),
            published: None,
        }
    }

    pub fn render(&self) -> String {
        let size = match self.size {
            SizeNote::Estimated(bytes) => format!("~{}", format_size(bytes)),
            SizeNote::Actual(bytes) => format_size(bytes),
        };
        let mut lines = vec![
            self.title.to_string(),
            self.channel.to_string(),
            format!("Duration: {}", format_duration(self.duration_secs)),
            format!("Size: {size}"),
        ];
        if let Some(published) = self.published {
            lines.push(format!("Published: {}", format_date(published)));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;
    use tubecast_core::Availability;

    use super::*;

    #[test]
    fn video_caption_has_estimate_and_date() {
        let info = VideoInfo {
            id: "abc".into(),
            title: "Song".into(),
            channel_title: "Band".into(),
            published_at: Some(Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap()),
            duration_secs: 600,
            thumbnails: BTreeMap::new(),
        };
        assert_eq!(
            Caption::for_video(&info, 12_380_400).render(),
            "Song\nBand\nDuration: 10:00\nSize: ~11.81 MB\nPublished: 2021-06-01"
        );
    }

    #[test]
    fn stored_caption_uses_actual_size() {
        let audio = AudioEntity {
            title: "Song".into(),
            channel: "Band".into(),
            duration_secs: 253,
            size_bytes: 4_000_000,
            thumb_ref: "t".into(),
            file_ref: "f".into(),
            availability: Availability::Available,
        };
        assert_eq!(
            Caption::for_stored(&audio).render(),
            "Song\nBand\nDuration: 04:13\nSize: 3.81 MB"
        );
    }
}
