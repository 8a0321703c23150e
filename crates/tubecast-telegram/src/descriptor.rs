// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of replayable media references from sent messages.

use teloxide::types::Message;
use tubecast_core::{MessageDescriptor, MessageId};

/// Maps a sent Telegram message into a [`MessageDescriptor`].
///
/// The photo reference is the largest size Telegram generated, which is the
/// last entry of the photo array.
pub fn describe(message: &Message) -> MessageDescriptor {
    MessageDescriptor {
        message_id: MessageId(message.id.0.to_string()),
        photo_ref: message
            .photo()
            .and_then(|sizes| sizes.last())
            .map(|size| size.file.id.0.clone()),
        audio_ref: message.audio().map(|audio| audio.file.id.0.clone()),
    }
}
