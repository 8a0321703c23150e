// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dispatch loop: receives inbound messages and runs each on its own task.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};
use tubecast_core::{InboundMessage, TubecastError, UpdateSource};

use crate::coordinator::Coordinator;

pub struct DispatchLoop {
    source: Arc<dyn UpdateSource>,
    coordinator: Arc<Coordinator>,
    allowed_chats: HashSet<String>,
    tracker: TaskTracker,
}

impl DispatchLoop {
    /// An empty `allowed_chats` admits every chat.
    pub fn new(
        source: Arc<dyn UpdateSource>,
        coordinator: Arc<Coordinator>,
        allowed_chats: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            source,
            coordinator,
            allowed_chats: allowed_chats
                .into_iter()
                .map(|chat| chat.trim().to_string())
                .collect(),
            tracker: TaskTracker::new(),
        }
    }

    pub fn is_allowed(&self, message: &InboundMessage) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&message.channel.0)
    }

    /// Runs until the token is cancelled or the source closes, then waits
    /// for every spawned request to finish.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), TubecastError> {
        info!("dispatch loop running");

        loop {
            tokio::select! {
                received = self.source.receive() => {
                    match received {
                        Ok(message) => self.dispatch(message),
                        Err(e) => {
                            error!(error = %e, "update source receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping dispatch loop");
                    break;
                }
            }
        }

        self.tracker.close();
        if !self.tracker.is_empty() {
            info!(count = self.tracker.len(), "waiting for running requests");
        }
        self.tracker.wait().await;
        info!("dispatch loop stopped");
        Ok(())
    }

    fn dispatch(&self, message: InboundMessage) {
        if !self.is_allowed(&message) {
            debug!(channel = %message.channel, "ignoring message from unlisted chat");
            return;
        }
        let coordinator = self.coordinator.clone();
        self.tracker.spawn(async move {
            if let Err(e) = coordinator.handle_message(&message).await {
                error!(channel = %message.channel, error = %e, "failed to handle message");
            }
        });
    }
}
