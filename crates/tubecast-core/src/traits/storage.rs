// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for delivered audio records and their history.

use async_trait::async_trait;

use crate::error::TubecastError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AudioEntity, HistoryEntry};

/// Key-value map from external id to [`AudioEntity`] plus an append-only
/// history of every `set`.
#[async_trait]
pub trait AudioStore: PluginAdapter {
    /// Opens the backend (connection, migrations).
    async fn initialize(&self) -> Result<(), TubecastError>;

    /// Flushes pending writes and releases the backend.
    async fn close(&self) -> Result<(), TubecastError>;

    async fn exists(&self, id: &str) -> Result<bool, TubecastError>;

    /// Returns [`TubecastError::NotFound`] for unknown ids.
    async fn get(&self, id: &str) -> Result<AudioEntity, TubecastError>;

    /// Like [`get`](Self::get) but maps a miss to `None`.
    async fn find(&self, id: &str) -> Result<Option<AudioEntity>, TubecastError>;

    /// Upserts the entity and appends `id` to the history.
    async fn set(&self, id: &str, audio: &AudioEntity) -> Result<(), TubecastError>;

    /// Number of history entries.
    async fn count(&self) -> Result<u64, TubecastError>;

    /// The `n` most recent history entries, newest first.
    async fn last_n(&self, n: usize) -> Result<Vec<HistoryEntry>, TubecastError>;
}
