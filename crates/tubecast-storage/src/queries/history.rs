// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only history reads.

use rusqlite::params;
use tubecast_core::{HistoryEntry, TubecastError};

use crate::database::{map_tr_err, Database};
use crate::queries::audios::{audio_from_row, AUDIO_COLUMNS};

/// Number of history entries.
pub async fn count(db: &Database) -> Result<u64, TubecastError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

/// The `n` newest history entries joined to their current audio state.
///
/// Repeated ids appear once per write.
pub async fn last_n(db: &Database, n: usize) -> Result<Vec<HistoryEntry>, TubecastError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT h.id, h.video_id, {AUDIO_COLUMNS}
                 FROM history h
                 JOIN audios a ON a.id = h.video_id
                 ORDER BY h.id DESC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![n], |row| {
                Ok(HistoryEntry {
                    seq: row.get(0)?,
                    video_id: row.get(1)?,
                    audio: audio_from_row(row, 2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
