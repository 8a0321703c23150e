// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram messaging gateway for tubecast.
//!
//! Implements [`MessagingGateway`] and [`UpdateSource`] for the Telegram Bot
//! API via teloxide. Inbound text messages arrive through long polling and are
//! queued for the dispatch loop.

pub mod descriptor;
pub mod handler;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, ReplyParameters};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tubecast_config::model::TelegramConfig;
use tubecast_core::{
    AdapterType, AudioPayload, ChannelId, ChatAction, HealthStatus, InboundMessage, Media,
    MessageDescriptor, MessageId, MessagingGateway, PluginAdapter, TubecastError, UpdateSource,
};

use crate::descriptor::describe;

const SERVICE: &str = "telegram";
const INBOUND_BUFFER: usize = 100;

/// Telegram gateway backed by a teloxide [`Bot`].
pub struct TelegramGateway {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramGateway {
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, TubecastError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            TubecastError::Config("telegram.bot_token is required for the Telegram gateway".into())
        })?;
        if token.is_empty() {
            return Err(TubecastError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }
        Ok(Self::with_bot(Bot::new(token)))
    }

    /// Wraps an already configured bot (custom API URL, custom client).
    pub fn with_bot(bot: Bot) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);
        Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

fn chat_id(channel: &ChannelId) -> Result<ChatId, TubecastError> {
    channel
        .0
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| TubecastError::Input(format!("invalid chat id `{channel}`: {e}")))
}

fn reply_parameters(
    reply_to: Option<&MessageId>,
) -> Result<Option<ReplyParameters>, TubecastError> {
    reply_to
        .map(|id| {
            id.0.parse::<i32>()
                .map(|n| ReplyParameters::new(teloxide::types::MessageId(n)))
                .map_err(|e| TubecastError::Input(format!("invalid message id `{id}`: {e}")))
        })
        .transpose()
}

fn input_file(media: Media) -> InputFile {
    match media {
        Media::Upload(path) => InputFile::file(path),
        Media::Reference(id) => InputFile::file_id(FileId(id)),
    }
}

fn chat_action(action: ChatAction) -> teloxide::types::ChatAction {
    match action {
        ChatAction::Typing => teloxide::types::ChatAction::Typing,
        ChatAction::UploadPhoto => teloxide::types::ChatAction::UploadPhoto,
        // The Bot API has no dedicated audio upload indicator.
        ChatAction::UploadAudio => teloxide::types::ChatAction::UploadVoice,
    }
}

fn send_error(what: &str, e: teloxide::RequestError) -> TubecastError {
    TubecastError::external(SERVICE, format!("failed to send {what}: {e}"), e)
}

#[async_trait]
impl PluginAdapter for TelegramGateway {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, TubecastError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), TubecastError> {
        debug!("Telegram gateway shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_message(
        &self,
        channel: &ChannelId,
        text: &str,
        reply_to: Option<&MessageId>,
    ) -> Result<MessageDescriptor, TubecastError> {
        let mut request = self.bot.send_message(chat_id(channel)?, text);
        if let Some(params) = reply_parameters(reply_to)? {
            request = request.reply_parameters(params);
        }
        let sent = request.await.map_err(|e| send_error("message", e))?;
        Ok(describe(&sent))
    }

    async fn send_photo(
        &self,
        channel: &ChannelId,
        photo: Media,
        caption: Option<&str>,
        reply_to: Option<&MessageId>,
    ) -> Result<MessageDescriptor, TubecastError> {
        let mut request = self.bot.send_photo(chat_id(channel)?, input_file(photo));
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        if let Some(params) = reply_parameters(reply_to)? {
            request = request.reply_parameters(params);
        }
        let sent = request.await.map_err(|e| send_error("photo", e))?;
        Ok(describe(&sent))
    }

    async fn send_audio(
        &self,
        channel: &ChannelId,
        audio: AudioPayload,
        caption: Option<&str>,
        reply_to: Option<&MessageId>,
    ) -> Result<MessageDescriptor, TubecastError> {
        let duration = u32::try_from(audio.duration_secs).unwrap_or(u32::MAX);
        let mut request = self
            .bot
            .send_audio(chat_id(channel)?, input_file(audio.media))
            .title(audio.title)
            .performer(audio.performer)
            .duration(duration);
        if let Some(thumb) = audio.thumbnail {
            request = request.thumbnail(InputFile::file(thumb));
        }
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        if let Some(params) = reply_parameters(reply_to)? {
            request = request.reply_parameters(params);
        }
        let sent = request.await.map_err(|e| send_error("audio", e))?;
        Ok(describe(&sent))
    }

    async fn send_chat_action(
        &self,
        channel: &ChannelId,
        action: ChatAction,
    ) -> Result<(), TubecastError> {
        self.bot
            .send_chat_action(chat_id(channel)?, chat_action(action))
            .await
            .map_err(|e| send_error("chat action", e))?;
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for TelegramGateway {
    async fn connect(&mut self) -> Result<(), TubecastError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                async move {
                    match handler::to_inbound_message(&msg) {
                        Some(inbound) => {
                            if tx.send(inbound).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        None => {
                            debug!(msg_id = msg.id.0, "ignoring non-text message");
                        }
                    }
                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn receive(&self) -> Result<InboundMessage, TubecastError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| TubecastError::External {
            service: SERVICE,
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}
