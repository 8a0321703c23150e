// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audio streams from a `yt-dlp` child process.
//!
//! The process writes the selected format to stdout. Its exit status is only
//! known once stdout is drained, so a failing exit surfaces as a read error at
//! the end of the stream, where the conversion engine sees it. Stderr is
//! drained on its own task from launch so a full pipe never stalls stdout.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;

use futures::StreamExt;
use regex::Regex;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, Command};
use tokio::task::JoinHandle;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{debug, warn};
use tubecast_core::{AudioStream, TubecastError};

const STDERR_TAIL: usize = 2048;

static HTTP_ERROR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"HTTP Error (\d{3})").unwrap());

/// Launches `yt-dlp` for one video at a time.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    format: String,
    watch_base: String,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>, format: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            format: format.into(),
            watch_base: "https://www.youtube.com/watch?v=".to_string(),
        }
    }

    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }

    pub fn args(&self, id: &str) -> Vec<String> {
        vec![
            "-f".to_string(),
            self.format.clone(),
            "-o".to_string(),
            "-".to_string(),
            "--quiet".to_string(),
            "--no-playlist".to_string(),
            "--".to_string(),
            format!("{}{id}", self.watch_base),
        ]
    }

    /// Spawns the process and returns its stdout as a lazy stream.
    pub fn open(&self, id: &str) -> Result<AudioStream, TubecastError> {
        if id.trim().is_empty() {
            return Err(TubecastError::Input("empty video id".into()));
        }
        let mut child = Command::new(&self.binary)
            .args(self.args(id))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                TubecastError::external(
                    "youtube",
                    format!("failed to launch {}: {e}", self.binary.display()),
                    e,
                )
            })?;
        debug!(video_id = id, pid = child.id(), "audio stream opened");

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(TubecastError::Internal(
                "yt-dlp launched without piped output".into(),
            ));
        };

        let stderr = drain_stderr(stderr, id.to_string());
        let id = id.to_string();
        let tail = futures::stream::once(async move { finish(child, stderr, &id).await })
            .filter_map(|outcome| async move { outcome.err().map(Err) });
        let body = ReaderStream::new(stdout).chain(tail);
        Ok(Box::pin(StreamReader::new(body)))
    }
}

fn drain_stderr(mut stderr: ChildStderr, id: String) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut captured = Vec::new();
        if let Err(e) = stderr.read_to_end(&mut captured).await {
            warn!(video_id = %id, error = %e, "failed to read yt-dlp stderr");
        }
        let start = captured.len().saturating_sub(STDERR_TAIL);
        String::from_utf8_lossy(&captured[start..]).into_owned()
    })
}

/// Waits for exit; a failure becomes the stream's final read error.
async fn finish(mut child: Child, stderr: JoinHandle<String>, id: &str) -> io::Result<()> {
    let status = child.wait().await?;
    let stderr = stderr.await.unwrap_or_default();
    if status.success() {
        debug!(video_id = id, "audio stream finished");
        return Ok(());
    }
    Err(io::Error::other(failure_message(&status.to_string(), &stderr)))
}

/// Surfaces the HTTP status, when yt-dlp reports one, as a bare number.
pub fn failure_message(status: &str, stderr: &str) -> String {
    let tail_start = stderr.len().saturating_sub(STDERR_TAIL);
    let tail = stderr.get(tail_start..).unwrap_or(stderr);
    if let Some(caps) = HTTP_ERROR_RE.captures(tail)
        && let Some(code) = caps.get(1)
    {
        return format!(
            "audio source responded with status code {} ({})",
            code.as_str(),
            last_line(tail)
        );
    }
    format!("yt-dlp exited with {status}: {}", last_line(tail))
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_end_with_watch_url() {
        let ytdlp = YtDlp::new("yt-dlp", "bestaudio");
        let args = ytdlp.args("abc");
        assert_eq!(args[..4], ["-f", "bestaudio", "-o", "-"]);
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc");
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn http_errors_keep_their_status() {
        let msg = failure_message(
            "exit status: 1",
            "WARNING: x\nERROR: unable to download video data: HTTP Error 403: Forbidden\n",
        );
        assert!(msg.contains(" 403 "), "got {msg}");
    }

    #[test]
    fn other_failures_report_last_line() {
        let msg = failure_message("exit status: 1", "ERROR: Video unavailable\n\n");
        assert_eq!(msg, "yt-dlp exited with exit status: 1: ERROR: Video unavailable");
        assert!(failure_message("exit status: 2", "").ends_with("no output"));
    }

    #[tokio::test]
    async fn empty_id_is_rejected() {
        let err = YtDlp::new("yt-dlp", "bestaudio").open(" ").err().unwrap();
        assert!(matches!(err, TubecastError::Input(_)));
    }

    #[tokio::test]
    async fn missing_binary_fails_to_launch() {
        let err = YtDlp::new("/nonexistent/yt-dlp", "bestaudio")
            .open("abc")
            .err()
            .unwrap();
        assert!(err.to_string().contains("failed to launch"), "got {err}");
    }

    #[cfg(unix)]
    mod process {
        use std::os::unix::fs::PermissionsExt;

        use tokio::io::AsyncReadExt;

        use super::*;

        fn script(dir: &tempfile::TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("fake-yt-dlp");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn streams_stdout() {
            let dir = tempfile::tempdir().unwrap();
            let ytdlp = YtDlp::new(script(&dir, "printf 'audio-bytes'"), "bestaudio");
            let mut stream = ytdlp.open("abc").unwrap();
            let mut out = Vec::new();
            stream.read_to_end(&mut out).await.unwrap();
            assert_eq!(out, b"audio-bytes");
        }

        #[tokio::test]
        async fn chatty_stderr_does_not_stall_stdout() {
            let dir = tempfile::tempdir().unwrap();
            let ytdlp = YtDlp::new(
                script(
                    &dir,
                    "head -c 200000 /dev/zero | tr '\\0' 'w' >&2\nprintf 'audio-bytes'",
                ),
                "bestaudio",
            );
            let mut stream = ytdlp.open("abc").unwrap();
            let mut out = Vec::new();
            tokio::time::timeout(
                std::time::Duration::from_secs(10),
                stream.read_to_end(&mut out),
            )
            .await
            .expect("stdout stalled behind stderr")
            .unwrap();
            assert_eq!(out, b"audio-bytes");
        }

        #[tokio::test]
        async fn failing_exit_is_a_read_error_after_the_data() {
            let dir = tempfile::tempdir().unwrap();
            let ytdlp = YtDlp::new(
                script(
                    &dir,
                    "printf 'partial'\necho 'ERROR: HTTP Error 403: Forbidden' >&2\nexit 1",
                ),
                "bestaudio",
            );
            let mut stream = ytdlp.open("abc").unwrap();
            let mut out = Vec::new();
            let err = stream.read_to_end(&mut out).await.unwrap_err();
            assert_eq!(out, b"partial");
            assert!(err.to_string().contains("status code 403"), "got {err}");
        }
    }
}
