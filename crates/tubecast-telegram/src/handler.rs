// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of incoming Telegram messages into [`InboundMessage`]s.

use teloxide::types::Message;
use tubecast_core::{ChannelId, InboundMessage, MessageId};

/// Returns `None` for anything without text (stickers, photos, joins).
pub fn to_inbound_message(msg: &Message) -> Option<InboundMessage> {
    let text = msg.text()?;
    Some(InboundMessage {
        channel: ChannelId(msg.chat.id.0.to_string()),
        message_id: MessageId(msg.id.0.to_string()),
        sender_id: msg.from.as_ref().map(|user| user.id.0.to_string()),
        text: text.to_string(),
    })
}
