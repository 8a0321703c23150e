// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP downloads into the content cache.
//!
//! Redirects are followed by hand so the hop count is ours to cap and every
//! hop shows up in the logs.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::LOCATION;
use reqwest::{StatusCode, Url};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use tubecast_core::{AdapterType, HealthStatus, NetworkLoader, PluginAdapter, TubecastError};

use crate::cache::{extension_of, ContentCache};

/// Redirect hops followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

const SERVICE: &str = "network";

/// Streams remote files into freshly allocated cache paths.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    cache: Arc<ContentCache>,
    max_redirects: usize,
    timeout: Duration,
}

impl HttpLoader {
    pub fn new(
        cache: Arc<ContentCache>,
        max_redirects: usize,
        timeout: Duration,
    ) -> Result<Self, TubecastError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| TubecastError::external(SERVICE, "failed to build HTTP client", e))?;
        Ok(Self {
            client,
            cache,
            max_redirects,
            timeout,
        })
    }

    /// Follows redirects up to the cap and returns the final 2xx response.
    async fn fetch(&self, url: &str) -> Result<reqwest::Response, TubecastError> {
        let mut current = Url::parse(url)
            .map_err(|e| TubecastError::Input(format!("invalid URL `{url}`: {e}")))?;
        let mut redirects = 0;

        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| transport_error(e, self.timeout, &format!("GET {current} failed")))?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status.is_redirection() {
                if redirects >= self.max_redirects {
                    return Err(TubecastError::External {
                        service: SERVICE,
                        message: format!("too many redirects fetching {url}"),
                        source: None,
                    });
                }
                let next = redirect_target(&response)?;
                info!(from = %current, to = %next, "following redirect");
                current = next;
                redirects += 1;
                continue;
            }

            return Err(status_error(&current, status));
        }
    }
}

/// Timeouts keep their own variant; every other transport error is external.
fn transport_error(e: reqwest::Error, timeout: Duration, context: &str) -> TubecastError {
    if e.is_timeout() {
        return TubecastError::Timeout { duration: timeout };
    }
    TubecastError::external(SERVICE, format!("{context}: {e}"), e)
}

fn redirect_target(response: &reqwest::Response) -> Result<Url, TubecastError> {
    let url = response.url();
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| TubecastError::External {
            service: SERVICE,
            message: format!(
                "{url} answered {} without a Location header",
                response.status()
            ),
            source: None,
        })?;
    url.join(location).map_err(|e| TubecastError::External {
        service: SERVICE,
        message: format!("bad redirect target `{location}` from {url}: {e}"),
        source: None,
    })
}

fn status_error(url: &Url, status: StatusCode) -> TubecastError {
    TubecastError::External {
        service: SERVICE,
        message: format!(
            "failed to get {url}: status code {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        ),
        source: None,
    }
}

/// Extension taken from the last URL path segment.
fn url_extension(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    extension_of(Path::new(last))
}

#[async_trait]
impl PluginAdapter for HttpLoader {
    fn name(&self) -> &str {
        "http-loader"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Loader
    }

    async fn health_check(&self) -> Result<HealthStatus, TubecastError> {
        if self.cache.root().is_dir() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("cache root is missing".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), TubecastError> {
        Ok(())
    }
}

#[async_trait]
impl NetworkLoader for HttpLoader {
    async fn load_file(&self, url: &str) -> Result<PathBuf, TubecastError> {
        info!(url, "loading file");
        let response = self.fetch(url).await?;
        let path = self.cache.allocate(&url_extension(response.url()))?;

        let written = write_body(response, &path, self.timeout).await;
        match written {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes, "file loaded");
                Ok(path)
            }
            Err(e) => {
                if path.exists()
                    && let Err(release_err) = self.cache.release(&path)
                {
                    warn!(error = %release_err, "failed to release partial download");
                }
                Err(e)
            }
        }
    }
}

async fn write_body(
    response: reqwest::Response,
    path: &Path,
    timeout: Duration,
) -> Result<u64, TubecastError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| TubecastError::external(SERVICE, "failed to create download target", e))?;
    let mut body = response.bytes_stream();
    let mut total = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| transport_error(e, timeout, "download interrupted"))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| TubecastError::external(SERVICE, "failed to write download", e))?;
        total += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| TubecastError::external(SERVICE, "failed to flush download", e))?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn loader(dir: &tempfile::TempDir) -> HttpLoader {
        let cache = ContentCache::open(dir.path().join("cache")).expect("open cache");
        HttpLoader::new(Arc::new(cache), DEFAULT_MAX_REDIRECTS, Duration::from_secs(5))
            .expect("build loader")
    }

    #[tokio::test]
    async fn loads_file_into_cache_with_url_extension() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vi/abc/maxresdefault.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let loader = loader(&dir);
        let path = loader
            .load_file(&format!("{}/vi/abc/maxresdefault.jpg", server.uri()))
            .await
            .unwrap();

        assert!(path.starts_with(loader.cache.root()));
        assert_eq!(extension_of(&path), "jpg");
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg-bytes");
    }

    #[tokio::test]
    async fn follows_relative_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old.png"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new.png"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = loader(&dir)
            .load_file(&format!("{}/old.png", server.uri()))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"png");
    }

    #[tokio::test]
    async fn gives_up_after_redirect_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/loop"))
            .expect(DEFAULT_MAX_REDIRECTS as u64 + 1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let loader = loader(&dir);
        let err = loader
            .load_file(&format!("{}/loop", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too many redirects"), "got {err}");
        assert_eq!(std::fs::read_dir(loader.cache.root()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn client_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = loader(&dir)
            .load_file(&format!("{}/missing.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"), "got {err}");
    }

    #[tokio::test]
    async fn redirect_without_location_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = loader(&dir)
            .load_file(&format!("{}/x.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Location"), "got {err}");
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"late".to_vec())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = ContentCache::open(dir.path().join("cache")).unwrap();
        let loader = HttpLoader::new(
            Arc::new(cache),
            DEFAULT_MAX_REDIRECTS,
            Duration::from_millis(200),
        )
        .unwrap();

        let err = loader
            .load_file(&format!("{}/slow.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(
            matches!(err, TubecastError::Timeout { duration } if duration == Duration::from_millis(200)),
            "got {err:?}"
        );
        assert_eq!(std::fs::read_dir(loader.cache.root()).unwrap().count(), 0);
    }

    #[test]
    fn url_extension_ignores_query() {
        let url = Url::parse("https://i.ytimg.com/vi/x/hqdefault.jpg?sqp=abc.def").unwrap();
        assert_eq!(url_extension(&url), "jpg");
        let bare = Url::parse("https://example.com/").unwrap();
        assert_eq!(url_extension(&bare), "bin");
    }
}
