// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging gateway for deterministic testing.
//!
//! `MockGateway` records everything sent through it and hands out stable
//! fake media references. It is also an [`UpdateSource`] with injectable
//! inbound messages.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tubecast_core::{
    AdapterType, AudioPayload, ChannelId, ChatAction, HealthStatus, InboundMessage, Media,
    MessageDescriptor, MessageId, MessagingGateway, PluginAdapter, TubecastError, UpdateSource,
};

/// One captured outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message {
        channel: ChannelId,
        text: String,
        reply_to: Option<MessageId>,
    },
    Photo {
        channel: ChannelId,
        photo: Media,
        caption: Option<String>,
        /// Whether an uploaded file existed at send time.
        file_present: bool,
    },
    Audio {
        channel: ChannelId,
        audio: AudioPayload,
        caption: Option<String>,
        file_present: bool,
    },
    Action {
        channel: ChannelId,
        action: ChatAction,
    },
}

pub struct MockGateway {
    sent: Arc<Mutex<Vec<Sent>>>,
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    notify: Arc<Notify>,
    next_id: AtomicU64,
    closed: Arc<Mutex<bool>>,
    fail_audio: Arc<Mutex<bool>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
            next_id: AtomicU64::new(1000),
            closed: Arc::new(Mutex::new(false)),
            fail_audio: Arc::new(Mutex::new(false)),
        }
    }

    /// Queues a message for the next `receive()`.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// Makes `receive()` fail with a "closed" error once the queue drains.
    pub async fn close(&self) {
        *self.closed.lock().await = true;
        self.notify.notify_one();
    }

    /// Makes every later `send_audio` fail the way a rejected upload does.
    pub async fn fail_audio_uploads(&self) {
        *self.fail_audio.lock().await = true;
    }

    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    /// Texts of plain messages, in order.
    pub async fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|sent| match sent {
                Sent::Message { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn audios(&self) -> Vec<Sent> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|sent| matches!(sent, Sent::Audio { .. }))
            .cloned()
            .collect()
    }

    pub async fn photos(&self) -> Vec<Sent> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|sent| matches!(sent, Sent::Photo { .. }))
            .cloned()
            .collect()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    fn next_message_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst).to_string())
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn present(media: &Media) -> bool {
    match media {
        Media::Upload(path) => Path::new(path).is_file(),
        Media::Reference(_) => true,
    }
}

/// Uploads get a fresh reference, references are echoed back.
fn reference(media: &Media, kind: &str, id: &MessageId) -> String {
    match media {
        Media::Upload(_) => format!("{kind}-ref-{id}"),
        Media::Reference(existing) => existing.clone(),
    }
}

#[async_trait]
impl PluginAdapter for MockGateway {
    fn name(&self) -> &str {
        "mock-gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, TubecastError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TubecastError> {
        Ok(())
    }
}

#[async_trait]
impl MessagingGateway for MockGateway {
    async fn send_message(
        &self,
        channel: &ChannelId,
        text: &str,
        reply_to: Option<&MessageId>,
    ) -> Result<MessageDescriptor, TubecastError> {
        self.sent.lock().await.push(Sent::Message {
            channel: channel.clone(),
            text: text.to_string(),
            reply_to: reply_to.cloned(),
        });
        Ok(MessageDescriptor {
            message_id: self.next_message_id(),
            photo_ref: None,
            audio_ref: None,
        })
    }

    async fn send_photo(
        &self,
        channel: &ChannelId,
        photo: Media,
        caption: Option<&str>,
        _reply_to: Option<&MessageId>,
    ) -> Result<MessageDescriptor, TubecastError> {
        let message_id = self.next_message_id();
        let photo_ref = reference(&photo, "photo", &message_id);
        self.sent.lock().await.push(Sent::Photo {
            channel: channel.clone(),
            file_present: present(&photo),
            photo,
            caption: caption.map(String::from),
        });
        Ok(MessageDescriptor {
            message_id,
            photo_ref: Some(photo_ref),
            audio_ref: None,
        })
    }

    async fn send_audio(
        &self,
        channel: &ChannelId,
        audio: AudioPayload,
        caption: Option<&str>,
        _reply_to: Option<&MessageId>,
    ) -> Result<MessageDescriptor, TubecastError> {
        if *self.fail_audio.lock().await {
            return Err(TubecastError::External {
                service: "mock-gateway",
                message: "Request Entity Too Large".into(),
                source: None,
            });
        }
        let message_id = self.next_message_id();
        let audio_ref = reference(&audio.media, "audio", &message_id);
        self.sent.lock().await.push(Sent::Audio {
            channel: channel.clone(),
            file_present: present(&audio.media),
            audio,
            caption: caption.map(String::from),
        });
        Ok(MessageDescriptor {
            message_id,
            photo_ref: None,
            audio_ref: Some(audio_ref),
        })
    }

    async fn send_chat_action(
        &self,
        channel: &ChannelId,
        action: ChatAction,
    ) -> Result<(), TubecastError> {
        self.sent.lock().await.push(Sent::Action {
            channel: channel.clone(),
            action,
        });
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for MockGateway {
    async fn connect(&mut self) -> Result<(), TubecastError> {
        Ok(())
    }

    async fn receive(&self) -> Result<InboundMessage, TubecastError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
            }
            if *self.closed.lock().await {
                return Err(TubecastError::External {
                    service: "mock-gateway",
                    message: "inbound channel closed".into(),
                    source: None,
                });
            }
            self.notify.notified().await;
        }
    }
}
