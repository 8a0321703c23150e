// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing of inbound text to commands and their replies.

use tracing::debug;
use tubecast_core::{Availability, ChannelId, HistoryEntry, InboundMessage, TubecastError};

use crate::command::{Command, RECENT_LIMIT, USAGE};
use crate::coordinator::Coordinator;
use crate::human::{format_duration, format_size};

pub const PUZZLED: &str = "🤔";

impl Coordinator {
    /// Handles one inbound message end to end, replying in its channel.
    pub async fn handle_message(&self, message: &InboundMessage) -> Result<(), TubecastError> {
        let channel = &message.channel;
        let command = Command::parse(&message.text);
        debug!(channel = %channel, ?command, "routing message");

        match command {
            Command::Convert(id) => {
                let outcome = self
                    .handle_conversion_request(channel, &message.message_id, &id)
                    .await?;
                debug!(channel = %channel, video_id = %id, ?outcome, "request finished");
            }
            Command::Usage => {
                self.gateway
                    .send_message(channel, USAGE, Some(&message.message_id))
                    .await?;
            }
            Command::Help => {
                self.gateway
                    .send_message(channel, &help_text(), None)
                    .await?;
            }
            Command::Recent => self.send_recent(channel).await?,
            Command::Stats => self.send_stats(channel).await?,
            Command::Unknown => {
                self.gateway.send_message(channel, PUZZLED, None).await?;
            }
        }
        Ok(())
    }

    async fn send_recent(&self, channel: &ChannelId) -> Result<(), TubecastError> {
        let entries = self.store.last_n(RECENT_LIMIT).await?;
        self.gateway
            .send_message(channel, &render_recent(&entries), None)
            .await?;
        Ok(())
    }

    async fn send_stats(&self, channel: &ChannelId) -> Result<(), TubecastError> {
        let count = self.store.count().await?;
        let text = format!(
            "Conversions: {count}\nRunning ffmpeg processes: {}\nRequests in flight: {}",
            self.transcoder.active_count(),
            self.inflight.len()
        );
        self.gateway.send_message(channel, &text, None).await?;
        Ok(())
    }
}

fn help_text() -> String {
    format!(
        "Send a YouTube link and get its audio back.\n\n{USAGE}\n/recent - latest conversions\n/stats - counters"
    )
}

/// Numbered history listing, newest first.
pub fn render_recent(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "Nothing converted yet.".to_string();
    }
    let mut lines = vec!["Recent conversions:".to_string()];
    for (n, entry) in entries.iter().enumerate() {
        let audio = &entry.audio;
        let detail = match audio.availability {
            Availability::Available => format!(
                "{}, {}",
                format_duration(audio.duration_secs),
                format_size(audio.size_bytes)
            ),
            other => other.to_string(),
        };
        lines.push(format!(
            "{}. {} - {} ({detail})",
            n + 1,
            audio.title,
            audio.channel
        ));
    }
    lines.join("\n")
}
