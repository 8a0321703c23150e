// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the AudioStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use tubecast_config::model::StorageConfig;
use tubecast_core::{
    AdapterType, AudioEntity, AudioStore, HealthStatus, HistoryEntry, PluginAdapter,
    TubecastError,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed audio store.
///
/// The database is opened lazily by [`AudioStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new store; nothing is opened until `initialize`.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wraps an already opened database.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn db(&self) -> Result<&Database, TubecastError> {
        self.db.get().ok_or_else(|| TubecastError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TubecastError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TubecastError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl AudioStore for SqliteStore {
    async fn initialize(&self) -> Result<(), TubecastError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| TubecastError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TubecastError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool, TubecastError> {
        queries::audios::exists(self.db()?, id).await
    }

    async fn get(&self, id: &str) -> Result<AudioEntity, TubecastError> {
        self.find(id).await?.ok_or_else(|| TubecastError::NotFound { id: id.to_string() })
    }

    async fn find(&self, id: &str) -> Result<Option<AudioEntity>, TubecastError> {
        queries::audios::find(self.db()?, id).await
    }

    async fn set(&self, id: &str, audio: &AudioEntity) -> Result<(), TubecastError> {
        let seq = queries::audios::upsert_with_history(self.db()?, id, audio).await?;
        debug!(video_id = id, seq, availability = %audio.availability, "audio record written");
        Ok(())
    }

    async fn count(&self) -> Result<u64, TubecastError> {
        queries::history::count(self.db()?).await
    }

    async fn last_n(&self, n: usize) -> Result<Vec<HistoryEntry>, TubecastError> {
        queries::history::last_n(self.db()?, n).await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tubecast_core::Availability;

    use super::*;

    fn make_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string_lossy().into_owned(),
            wal_mode: true,
        }
    }

    fn entity(title: &str) -> AudioEntity {
        AudioEntity {
            title: title.to_string(),
            channel: "Uploader".to_string(),
            duration_secs: 600,
            size_bytes: 12_380_400,
            thumb_ref: "AgAD-thumb".to_string(),
            file_ref: "CQAD-file".to_string(),
            availability: Availability::Available,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("t.db")));
        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("t.db")));
        assert!(store.health_check().await.is_err());
        assert!(store.exists("a").await.is_err());
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("t.db")));
        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn get_distinguishes_missing_from_failure() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("t.db")));
        store.initialize().await.unwrap();

        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, TubecastError::NotFound { ref id } if id == "missing"));
        assert!(store.find("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_then_last_n_returns_latest() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("t.db")));
        store.initialize().await.unwrap();

        store.set("a", &entity("first")).await.unwrap();
        store.set("b", &entity("second")).await.unwrap();

        let latest = store.last_n(1).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].video_id, "b");
        assert_eq!(latest[0].audio.title, "second");
        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.get("a").await.unwrap(), entity("first"));
        assert!(store.exists("b").await.unwrap());
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("persist.db");
        {
            let store = SqliteStore::new(make_config(&path));
            store.initialize().await.unwrap();
            store.set("a", &entity("kept")).await.unwrap();
            store.close().await.unwrap();
        }
        let store = SqliteStore::new(make_config(&path));
        store.initialize().await.unwrap();
        assert_eq!(store.get("a").await.unwrap().title, "kept");
        store.shutdown().await.unwrap();
    }
}
