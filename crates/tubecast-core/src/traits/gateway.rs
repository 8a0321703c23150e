// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging gateway traits (Telegram and test doubles).

use async_trait::async_trait;

use crate::error::TubecastError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AudioPayload, ChannelId, ChatAction, InboundMessage, Media, MessageDescriptor, MessageId,
};

/// Outbound side of a messaging platform.
///
/// Every send returns a [`MessageDescriptor`] whose media references can be
/// replayed later through [`Media::Reference`] without uploading again.
#[async_trait]
pub trait MessagingGateway: PluginAdapter {
    /// Sends a plain text message.
    async fn send_message(
        &self,
        channel: &ChannelId,
        text: &str,
        reply_to: Option<&MessageId>,
    ) -> Result<MessageDescriptor, TubecastError>;

    /// Sends a photo with an optional caption.
    async fn send_photo(
        &self,
        channel: &ChannelId,
        photo: Media,
        caption: Option<&str>,
        reply_to: Option<&MessageId>,
    ) -> Result<MessageDescriptor, TubecastError>;

    /// Sends an audio file with an optional caption.
    async fn send_audio(
        &self,
        channel: &ChannelId,
        audio: AudioPayload,
        caption: Option<&str>,
        reply_to: Option<&MessageId>,
    ) -> Result<MessageDescriptor, TubecastError>;

    /// Shows a transient activity indicator.
    async fn send_chat_action(
        &self,
        channel: &ChannelId,
        action: ChatAction,
    ) -> Result<(), TubecastError>;
}

/// Inbound side of a messaging platform.
#[async_trait]
pub trait UpdateSource: PluginAdapter {
    /// Starts receiving updates from the platform.
    async fn connect(&mut self) -> Result<(), TubecastError>;

    /// Receives the next inbound text message.
    async fn receive(&self) -> Result<InboundMessage, TubecastError>;
}
