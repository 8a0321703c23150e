// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ffmpeg binary discovery.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};
use tubecast_core::TubecastError;

/// Tried in order when no binary is configured.
pub const FFMPEG_CANDIDATES: [&str; 4] = ["ffmpeg", "avconv", "./ffmpeg", "./avconv"];

/// Returns the configured binary if it runs, else the first working candidate.
pub async fn locate_ffmpeg(configured: Option<&str>) -> Result<PathBuf, TubecastError> {
    if let Some(binary) = configured {
        return if answers_version(binary).await {
            Ok(PathBuf::from(binary))
        } else {
            Err(TubecastError::Config(format!(
                "configured ffmpeg binary `{binary}` does not run"
            )))
        };
    }

    for candidate in FFMPEG_CANDIDATES {
        if answers_version(candidate).await {
            info!(binary = candidate, "ffmpeg found");
            return Ok(PathBuf::from(candidate));
        }
        debug!(binary = candidate, "ffmpeg candidate rejected");
    }
    Err(TubecastError::Config(format!(
        "ffmpeg binary not found (tried {})",
        FFMPEG_CANDIDATES.join(", ")
    )))
}

async fn answers_version(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}
