// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audio record operations.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tubecast_core::{AudioEntity, Availability, TubecastError};

use crate::database::{map_tr_err, Database};

/// Columns in the order [`audio_from_row`] expects, starting at `offset`.
pub(crate) const AUDIO_COLUMNS: &str =
    "title, channel, duration, size, thumb_id, file_id, available";

/// Builds an entity from seven consecutive columns.
pub(crate) fn audio_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<AudioEntity> {
    let availability: String = row.get(offset + 6)?;
    let availability = Availability::from_str(&availability).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(offset + 6, Type::Text, Box::new(e))
    })?;
    Ok(AudioEntity {
        title: row.get(offset)?,
        channel: row.get(offset + 1)?,
        duration_secs: row.get(offset + 2)?,
        size_bytes: row.get(offset + 3)?,
        thumb_ref: row.get(offset + 4)?,
        file_ref: row.get(offset + 5)?,
        availability,
    })
}

/// Whether a record exists for `id`.
pub async fn exists(db: &Database, id: &str) -> Result<bool, TubecastError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM audios WHERE id = ?1)",
                params![id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Fetches the record for `id`, `None` when absent.
pub async fn find(db: &Database, id: &str) -> Result<Option<AudioEntity>, TubecastError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {AUDIO_COLUMNS} FROM audios WHERE id = ?1"),
                params![id],
                |row| audio_from_row(row, 0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Upserts the record and appends `id` to the history in one transaction.
pub async fn upsert_with_history(
    db: &Database,
    id: &str,
    audio: &AudioEntity,
) -> Result<i64, TubecastError> {
    let id = id.to_string();
    let audio = audio.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO audios (id, thumb_id, file_id, title, channel, duration, size, available)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    thumb_id = excluded.thumb_id,
                    file_id = excluded.file_id,
                    title = excluded.title,
                    channel = excluded.channel,
                    duration = excluded.duration,
                    size = excluded.size,
                    available = excluded.available",
                params![
                    id,
                    audio.thumb_ref,
                    audio.file_ref,
                    audio.title,
                    audio.channel,
                    audio.duration_secs,
                    audio.size_bytes,
                    audio.availability.to_string(),
                ],
            )?;
            tx.execute("INSERT INTO history (video_id) VALUES (?1)", params![id])?;
            let seq = tx.last_insert_rowid();
            tx.commit()?;
            Ok(seq)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str, availability: Availability) -> AudioEntity {
        AudioEntity {
            title: title.to_string(),
            channel: "Channel".to_string(),
            duration_secs: 212,
            size_bytes: 4_374_408,
            thumb_ref: "thumb".to_string(),
            file_ref: "file".to_string(),
            availability,
        }
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(find(&db, "nope").await.unwrap().is_none());
        assert!(!exists(&db, "nope").await.unwrap());
    }

    #[tokio::test]
    async fn upsert_overwrites_and_appends_history() {
        let db = Database::open_in_memory().await.unwrap();
        let first = upsert_with_history(&db, "a", &sample("one", Availability::UnknownFailure))
            .await
            .unwrap();
        let second = upsert_with_history(&db, "a", &sample("two", Availability::Available))
            .await
            .unwrap();
        assert!(second > first);

        let stored = find(&db, "a").await.unwrap().unwrap();
        assert_eq!(stored.title, "two");
        assert_eq!(stored.availability, Availability::Available);
        assert!(exists(&db, "a").await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_availability_is_a_storage_error() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_with_history(&db, "a", &sample("one", Availability::Available))
            .await
            .unwrap();
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch(
                    "PRAGMA ignore_check_constraints = ON;
                     UPDATE audios SET available = 'maybe' WHERE id = 'a';",
                )
            })
            .await
            .unwrap();

        let err = find(&db, "a").await.unwrap_err();
        assert!(matches!(err, TubecastError::Storage { .. }));
    }
}
