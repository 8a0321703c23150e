// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of inbound text into bot commands.

use tubecast_youtube::extract_video_id;

pub const USAGE: &str = "Usage: /yt ( youtube.com/watch?v=<id> | youtu.be/<id> )";

/// Default number of entries listed by `/recent`.
pub const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Convert the video with this id.
    Convert(String),
    /// `/yt` without a usable link.
    Usage,
    Recent,
    Stats,
    /// `/start` or `/help`.
    Help,
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (head, rest) = text
            .split_once(char::is_whitespace)
            .map(|(head, rest)| (head, rest.trim()))
            .unwrap_or((text, ""));

        // Commands addressed in groups look like `/yt@SomeBot`.
        let name = head.split('@').next().unwrap_or(head);
        match name {
            "/yt" => match extract_video_id(rest) {
                Some(id) => Self::Convert(id.to_string()),
                _ => Self::Usage,
            },
            "/recent" => Self::Recent,
            "/stats" => Self::Stats,
            "/start" | "/help" => Self::Help,
            _ => match extract_video_id(text) {
                Some(id) => Self::Convert(id.to_string()),
                None => Self::Unknown,
            },
        }
    }
}
