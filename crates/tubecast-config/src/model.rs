// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for tubecast.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level tubecast configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TubecastConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// YouTube metadata and audio source settings.
    #[serde(default)]
    pub youtube: YoutubeConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Content cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// ffmpeg conversion settings.
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Upload limits.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Outbound HTTP settings.
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat ids allowed to use the bot. Empty allows everyone.
    #[serde(default)]
    pub allowed_chats: Vec<String>,
}

/// YouTube configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct YoutubeConfig {
    /// YouTube Data API v3 key. Required by `serve`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the Data API, overridable for tests and proxies.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Binary used to open audio streams.
    #[serde(default = "default_ytdlp_binary")]
    pub ytdlp_binary: String,

    /// Format selector passed to the stream binary.
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_api_base_url(),
            ytdlp_binary: default_ytdlp_binary(),
            audio_format: default_audio_format(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_ytdlp_binary() -> String {
    "yt-dlp".to_string()
}

fn default_audio_format() -> String {
    "bestaudio".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("tubecast").join("tubecast.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("tubecast.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Content cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Directory holding all temporary media files.
    #[serde(default = "default_cache_root")]
    pub root: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: default_cache_root(),
        }
    }
}

fn default_cache_root() -> String {
    "./cache".to_string()
}

/// ffmpeg conversion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversionConfig {
    /// Explicit ffmpeg binary. Discovered on `PATH` when unset.
    #[serde(default)]
    pub ffmpeg_binary: Option<String>,

    /// Maximum number of concurrently running ffmpeg processes.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Single wait before rechecking a full gate. No wait when unset.
    #[serde(default)]
    pub wait_timeout_ms: Option<u64>,

    /// Output audio codec.
    #[serde(default = "default_codec")]
    pub codec: String,

    /// Output audio bitrate.
    #[serde(default = "default_bitrate")]
    pub bitrate: String,

    /// Output container format.
    #[serde(default = "default_container")]
    pub container: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            ffmpeg_binary: None,
            max_parallel: default_max_parallel(),
            wait_timeout_ms: None,
            codec: default_codec(),
            bitrate: default_bitrate(),
            container: default_container(),
        }
    }
}

fn default_max_parallel() -> usize {
    6
}

fn default_codec() -> String {
    "aac".to_string()
}

fn default_bitrate() -> String {
    "160k".to_string()
}

fn default_container() -> String {
    "ipod".to_string()
}

/// Upload limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Largest file the gateway accepts, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Bytes of output produced per second of source, used to estimate size.
    #[serde(default = "default_bytes_per_second_estimate")]
    pub bytes_per_second_estimate: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            bytes_per_second_estimate: default_bytes_per_second_estimate(),
        }
    }
}

fn default_max_upload_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_bytes_per_second_estimate() -> u64 {
    20_634
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Redirects followed before a download gives up.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_redirects: default_max_redirects(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_max_redirects() -> usize {
    5
}

fn default_timeout_secs() -> u64 {
    60
}
