// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supervised ffmpeg processes behind the admission gate.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tubecast_cache::ContentCache;
use tubecast_core::{AudioStream, TrackTags, Transcoder, TubecastError};

use crate::gate::AdmissionGate;
use crate::profile::ConversionProfile;

/// Bytes of stderr kept for error messages.
const STDERR_TAIL: usize = 2048;

/// Runs ffmpeg for stream conversion and in-place tagging.
#[derive(Debug)]
pub struct FfmpegEngine {
    binary: PathBuf,
    profile: ConversionProfile,
    gate: AdmissionGate,
    cache: Arc<ContentCache>,
}

impl FfmpegEngine {
    pub fn new(
        binary: impl Into<PathBuf>,
        profile: ConversionProfile,
        max_parallel: usize,
        cache: Arc<ContentCache>,
    ) -> Self {
        Self {
            binary: binary.into(),
            profile,
            gate: AdmissionGate::new(max_parallel),
            cache,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn capacity(&self) -> usize {
        self.gate.capacity()
    }

    fn spawn(&self, args: Vec<OsString>, stdin: Stdio) -> Result<Child, TubecastError> {
        Command::new(&self.binary)
            .args(args)
            .stdin(stdin)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TubecastError::Pipeline {
                message: format!("failed to launch {}: {e}", self.binary.display()),
                source: Some(Box::new(e)),
            })
    }
}

/// Drains stderr so ffmpeg never blocks on a full pipe, keeping the tail.
fn collect_stderr(stderr: Option<ChildStderr>) -> JoinHandle<String> {
    tokio::spawn(async move {
        let Some(mut stderr) = stderr else {
            return String::new();
        };
        let mut buf = Vec::new();
        if let Err(e) = stderr.read_to_end(&mut buf).await {
            debug!(error = %e, "stderr read stopped early");
        }
        let start = buf.len().saturating_sub(STDERR_TAIL);
        String::from_utf8_lossy(&buf[start..]).trim().to_string()
    })
}

/// Waits for exit and turns a non-zero status into a pipeline failure.
async fn finish(mut child: Child, stderr: JoinHandle<String>) -> Result<(), TubecastError> {
    let status = child.wait().await.map_err(|e| TubecastError::Pipeline {
        message: format!("failed to wait for ffmpeg: {e}"),
        source: Some(Box::new(e)),
    })?;
    let diagnostics = stderr.await.unwrap_or_default();
    if status.success() {
        debug!("ffmpeg finished");
        Ok(())
    } else {
        Err(TubecastError::pipeline(format!(
            "ffmpeg exited with {status}: {diagnostics}"
        )))
    }
}

#[async_trait]
impl Transcoder for FfmpegEngine {
    async fn convert(
        &self,
        mut input: AudioStream,
        output: &Path,
        wait: Option<Duration>,
    ) -> Result<(), TubecastError> {
        let _permit = self.gate.admit(wait).await?;
        info!(output = %output.display(), active = self.gate.active(), "ffmpeg conversion started");

        let mut child = self.spawn(self.profile.convert_args(output), Stdio::piped())?;
        let stderr = collect_stderr(child.stderr.take());
        let Some(mut stdin) = child.stdin.take() else {
            return Err(TubecastError::Internal("ffmpeg stdin was not piped".into()));
        };

        let piped = tokio::io::copy(&mut input, &mut stdin).await;
        // Closing stdin is ffmpeg's end-of-input signal.
        drop(stdin);

        match piped {
            Ok(bytes) => debug!(bytes, "input stream drained"),
            // ffmpeg quit reading; its exit status tells why.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("ffmpeg closed its input early");
            }
            Err(e) => {
                warn!(error = %e, "input stream failed, terminating ffmpeg");
                if let Err(kill_err) = child.kill().await {
                    debug!(error = %kill_err, "ffmpeg already gone");
                }
                drop(input);
                stderr.abort();
                return Err(TubecastError::Pipeline {
                    message: e.to_string(),
                    source: Some(Box::new(e)),
                });
            }
        }

        finish(child, stderr).await
    }

    async fn tag_metadata(
        &self,
        path: &Path,
        tags: &TrackTags,
        cover: Option<&Path>,
        wait: Option<Duration>,
    ) -> Result<(), TubecastError> {
        let _permit = self.gate.admit(wait).await?;
        let source = self.cache.adopt(path)?;
        info!(path = %path.display(), cover = cover.is_some(), "ffmpeg tagging started");

        let result = match self.spawn(
            self.profile.tag_args(&source, tags, cover, path),
            Stdio::null(),
        ) {
            Ok(mut child) => {
                let stderr = collect_stderr(child.stderr.take());
                finish(child, stderr).await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = self.cache.release(&source) {
            warn!(error = %e, path = %source.display(), "failed to release tagging input");
        }
        result
    }

    fn active_count(&self) -> usize {
        self.gate.active()
    }
}
