// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Data API `videos` endpoint.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tubecast_core::{Thumbnail, VideoInfo};

use crate::duration::{parse_duration, DurationError};

#[derive(Debug, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub items: Vec<VideoDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDto {
    pub id: String,
    pub snippet: SnippetDto,
    pub content_details: ContentDetailsDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetDto {
    pub published_at: Option<String>,
    pub title: String,
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: BTreeMap<String, ThumbnailDto>,
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailDto {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub struct ContentDetailsDto {
    pub duration: String,
}

/// Error envelope returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("malformed videos response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("video `{id}` has a bad duration: {source}")]
    Duration {
        id: String,
        #[source]
        source: DurationError,
    },
}

/// Parses a `videos` body and converts the first item, if any.
pub fn parse_videos_response(body: &str) -> Result<Option<VideoInfo>, ResponseError> {
    let response: VideosResponse = serde_json::from_str(body)?;
    response
        .items
        .into_iter()
        .next()
        .map(VideoInfo::try_from)
        .transpose()
}

impl TryFrom<VideoDto> for VideoInfo {
    type Error = ResponseError;

    fn try_from(dto: VideoDto) -> Result<Self, Self::Error> {
        let duration_secs =
            parse_duration(&dto.content_details.duration).map_err(|source| {
                ResponseError::Duration {
                    id: dto.id.clone(),
                    source,
                }
            })?;
        // An unparseable timestamp only costs the date tag.
        let published_at = dto
            .snippet
            .published_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let thumbnails = dto
            .snippet
            .thumbnails
            .into_iter()
            .map(|(key, t)| {
                (
                    key,
                    Thumbnail {
                        url: t.url,
                        width: t.width,
                        height: t.height,
                    },
                )
            })
            .collect();

        Ok(VideoInfo {
            id: dto.id,
            title: dto.snippet.title,
            channel_title: dto.snippet.channel_title,
            published_at,
            duration_secs,
            thumbnails,
        })
    }
}
