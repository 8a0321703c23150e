// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tubecast recent` command implementation.

use tubecast_config::model::TubecastConfig;
use tubecast_coordinator::routing::render_recent;
use tubecast_core::{AudioStore, TubecastError};
use tubecast_storage::SqliteStore;

/// Prints the newest `n` history entries, newest first.
pub async fn run_recent(config: &TubecastConfig, n: usize) -> Result<(), TubecastError> {
    println!("{}", recent_listing(config, n).await?);
    Ok(())
}

async fn recent_listing(config: &TubecastConfig, n: usize) -> Result<String, TubecastError> {
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    let entries = store.last_n(n).await?;
    store.close().await?;
    Ok(render_recent(&entries))
}

#[cfg(test)]
mod tests {
    use tubecast_core::{AudioEntity, Availability};

    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> TubecastConfig {
        let mut config = TubecastConfig::default();
        config.storage.database_path = dir.path().join("t.db").to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn empty_database_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let text = recent_listing(&config_in(&dir), 10).await.unwrap();
        assert_eq!(text, "Nothing converted yet.");
    }

    #[tokio::test]
    async fn listing_is_limited_and_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        {
            let store = SqliteStore::new(config.storage.clone());
            store.initialize().await.unwrap();
            for title in ["one", "two", "three"] {
                let audio = AudioEntity {
                    title: title.into(),
                    channel: "Band".into(),
                    duration_secs: 60,
                    size_bytes: 1024,
                    thumb_ref: String::new(),
                    file_ref: format!("ref-{title}"),
                    availability: Availability::Available,
                };
                store.set(title, &audio).await.unwrap();
            }
            store.close().await.unwrap();
        }

        let text = recent_listing(&config, 2).await.unwrap();
        assert_eq!(
            text,
            "Recent conversions:\n1. three - Band (01:00, 1.00 KB)\n2. two - Band (01:00, 1.00 KB)"
        );
    }
}
