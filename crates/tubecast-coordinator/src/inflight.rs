// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel in-flight markers.
//!
//! A marker exists while a conversion triggered from a channel is running.
//! It is keyed by channel, not by video id, so two channels may still
//! convert the same video concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;
use tubecast_core::{ChannelId, MessageId};

#[derive(Debug, Default, Clone)]
pub struct InFlightRegistry {
    markers: Arc<Mutex<HashMap<ChannelId, MessageId>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the marker for `channel`, or returns the request already holding it.
    pub fn try_acquire(
        &self,
        channel: &ChannelId,
        request: &MessageId,
    ) -> Result<InFlightGuard, MessageId> {
        let mut markers = self.lock();
        if let Some(existing) = markers.get(channel) {
            return Err(existing.clone());
        }
        markers.insert(channel.clone(), request.clone());
        debug!(channel = %channel, request = %request, "in-flight marker set");
        Ok(InFlightGuard {
            registry: self.clone(),
            channel: channel.clone(),
        })
    }

    /// The request currently running for `channel`, if any.
    pub fn current(&self, channel: &ChannelId) -> Option<MessageId> {
        self.lock().get(channel).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ChannelId, MessageId>> {
        // The map stays consistent across a panicking holder.
        self.markers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the channel's marker when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: InFlightRegistry,
    channel: ChannelId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.channel);
        debug!(channel = %self.channel, "in-flight marker cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(channel: &str, request: &str) -> (ChannelId, MessageId) {
        (ChannelId(channel.into()), MessageId(request.into()))
    }

    #[test]
    fn second_acquire_reports_running_request() {
        let registry = InFlightRegistry::new();
        let (chat, first) = ids("42", "1");
        let guard = registry.try_acquire(&chat, &first).unwrap();

        let err = registry.try_acquire(&chat, &MessageId("2".into())).unwrap_err();
        assert_eq!(err, first);
        assert_eq!(registry.current(&chat), Some(first.clone()));

        drop(guard);
        assert!(registry.is_empty());
        assert!(registry.try_acquire(&chat, &MessageId("3".into())).is_ok());
    }

    #[test]
    fn channels_are_independent() {
        let registry = InFlightRegistry::new();
        let (a, r1) = ids("1", "10");
        let (b, r2) = ids("2", "20");
        let _ga = registry.try_acquire(&a, &r1).unwrap();
        let _gb = registry.try_acquire(&b, &r2).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn marker_is_cleared_on_panic() {
        let registry = InFlightRegistry::new();
        let (chat, request) = ids("42", "1");
        let inner = registry.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = inner.try_acquire(&chat, &request).unwrap();
            panic!("pipeline blew up");
        });
        assert!(result.is_err());
        assert!(registry.is_empty());
    }
}
