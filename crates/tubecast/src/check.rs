// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tubecast check` command implementation.
//!
//! Runs the startup prerequisites without connecting to Telegram: serve-only
//! credentials, ffmpeg discovery, cache root, and the store.

use tubecast_cache::ContentCache;
use tubecast_config::model::TubecastConfig;
use tubecast_core::{AudioStore, TubecastError};
use tubecast_ffmpeg::locate_ffmpeg;
use tubecast_storage::SqliteStore;

/// Status of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name,
            status,
            message: message.into(),
        }
    }
}

/// Runs every check, prints a report, and fails if any check failed.
pub async fn run_check(config: &TubecastConfig) -> Result<(), TubecastError> {
    let results = vec![
        check_credentials(config),
        check_ffmpeg(config).await,
        check_cache(config),
        check_store(config).await,
    ];

    println!();
    println!("  tubecast check");
    println!("  {}", "-".repeat(50));
    for result in &results {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        println!("    {tag} {:<12} {}", result.name, result.message);
    }
    println!();

    let failed = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    if failed > 0 {
        return Err(TubecastError::Config(format!("{failed} check(s) failed")));
    }
    Ok(())
}

fn check_credentials(config: &TubecastConfig) -> CheckResult {
    match tubecast_config::validate_for_serve(config) {
        Ok(()) => CheckResult::new("credentials", CheckStatus::Pass, "bot token and API key set"),
        Err(errors) => {
            let missing: Vec<String> = errors.iter().map(ToString::to_string).collect();
            // Only `serve` needs them.
            CheckResult::new("credentials", CheckStatus::Warn, missing.join("; "))
        }
    }
}

async fn check_ffmpeg(config: &TubecastConfig) -> CheckResult {
    match locate_ffmpeg(config.conversion.ffmpeg_binary.as_deref()).await {
        Ok(path) => CheckResult::new("ffmpeg", CheckStatus::Pass, path.display().to_string()),
        Err(e) => CheckResult::new("ffmpeg", CheckStatus::Fail, e.to_string()),
    }
}

fn check_cache(config: &TubecastConfig) -> CheckResult {
    match ContentCache::open(&config.cache.root) {
        Ok(cache) => CheckResult::new("cache", CheckStatus::Pass, cache.root().display().to_string()),
        Err(e) => CheckResult::new("cache", CheckStatus::Fail, e.to_string()),
    }
}

async fn check_store(config: &TubecastConfig) -> CheckResult {
    let store = SqliteStore::new(config.storage.clone());
    let counted = async {
        store.initialize().await?;
        let count = store.count().await?;
        store.close().await?;
        Ok::<_, TubecastError>(count)
    }
    .await;
    match counted {
        Ok(count) => CheckResult::new(
            "store",
            CheckStatus::Pass,
            format!("{} ({count} conversions)", config.storage.database_path),
        ),
        Err(e) => CheckResult::new("store", CheckStatus::Fail, e.to_string()),
    }
}
