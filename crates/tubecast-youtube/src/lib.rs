// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! YouTube metadata provider for tubecast.
//!
//! Video metadata comes from the Data API v3 `videos` endpoint; audio bytes
//! are streamed from a `yt-dlp` child process.

pub mod client;
pub mod duration;
pub mod link;
pub mod stream;
pub mod types;

pub use client::YoutubeClient;
pub use duration::{parse_duration, DurationError};
pub use link::extract_video_id;
pub use stream::YtDlp;
