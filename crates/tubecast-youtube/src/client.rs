// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! YouTube Data API v3 client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};
use tubecast_core::{
    AdapterType, AudioStream, HealthStatus, MetadataProvider, PluginAdapter, TubecastError,
    VideoInfo,
};

use crate::stream::YtDlp;
use crate::types::{parse_videos_response, ApiErrorResponse};

const SERVICE: &str = "youtube";

/// Metadata from the Data API, audio from `yt-dlp`.
pub struct YoutubeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    ytdlp: YtDlp,
}

impl YoutubeClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        ytdlp: YtDlp,
        timeout: Duration,
    ) -> Result<Self, TubecastError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TubecastError::external(SERVICE, "failed to build HTTP client", e))?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            ytdlp,
        })
    }
}

#[async_trait]
impl PluginAdapter for YoutubeClient {
    fn name(&self) -> &str {
        "youtube"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Metadata
    }

    async fn health_check(&self) -> Result<HealthStatus, TubecastError> {
        if self.api_key.is_empty() {
            return Ok(HealthStatus::Unhealthy("no API key".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TubecastError> {
        Ok(())
    }
}

#[async_trait]
impl MetadataProvider for YoutubeClient {
    async fn get_video_info(&self, id: &str) -> Result<Option<VideoInfo>, TubecastError> {
        if id.trim().is_empty() {
            return Err(TubecastError::Input("empty video id".into()));
        }
        let url = format!("{}/videos", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&[
                ("part", "contentDetails,snippet"),
                ("id", id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TubecastError::external(SERVICE, format!("GET /videos failed: {e}"), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TubecastError::external(SERVICE, "failed to read /videos body", e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or_default();
            warn!(video_id = id, status = status.as_u16(), detail = %detail, "videos lookup rejected");
            return Err(TubecastError::External {
                service: SERVICE,
                message: format!("Failed to get /videos: {}", status.as_u16()),
                source: None,
            });
        }

        let info = parse_videos_response(&body)
            .map_err(|e| TubecastError::external(SERVICE, e.to_string(), e))?;
        debug!(video_id = id, found = info.is_some(), "videos lookup done");
        Ok(info)
    }

    async fn get_audio_stream(&self, id: &str) -> Result<AudioStream, TubecastError> {
        self.ytdlp.open(id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> YoutubeClient {
        YoutubeClient::new(
            format!("{}/youtube/v3/", server.uri()),
            "test-key",
            YtDlp::new("yt-dlp", "bestaudio"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn video(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "snippet": {
                "publishedAt": "2021-06-01T12:00:00Z",
                "title": "Track",
                "channelTitle": "Band",
                "thumbnails": {
                    "maxres": {"url": "https://i.ytimg.com/vi/x/maxresdefault.jpg", "width": 1280, "height": 720}
                }
            },
            "contentDetails": {"duration": "PT10M"}
        })
    }

    #[tokio::test]
    async fn sends_expected_query_and_parses_item() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/videos"))
            .and(query_param("part", "contentDetails,snippet"))
            .and(query_param("id", "abc"))
            .and(query_param("key", "test-key"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [video("abc")]})))
            .expect(1)
            .mount(&server)
            .await;

        let info = client(&server).get_video_info("abc").await.unwrap().unwrap();
        assert_eq!(info.title, "Track");
        assert_eq!(info.channel_title, "Band");
        assert_eq!(info.duration_secs, 600);
        assert_eq!(info.best_thumbnail().unwrap().width, 1280);
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        assert!(client(&server).get_video_info("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn error_status_is_external_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(
                json!({"error": {"code": 403, "message": "quota exceeded"}}),
            ))
            .mount(&server)
            .await;

        let err = client(&server).get_video_info("abc").await.unwrap_err();
        assert!(
            matches!(&err, TubecastError::External { message, .. } if message == "Failed to get /videos: 403"),
            "got {err}"
        );
    }

    #[tokio::test]
    async fn malformed_body_is_external_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).get_video_info("abc").await.unwrap_err();
        assert!(matches!(err, TubecastError::External { .. }));
    }

    #[tokio::test]
    async fn empty_id_never_hits_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server).get_video_info("").await.unwrap_err();
        assert!(matches!(err, TubecastError::Input(_)));
    }
}
