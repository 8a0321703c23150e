// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::TubecastConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &TubecastConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let mut require_non_empty = |value: &str, key: &str| {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not be empty"),
            });
        }
    };
    require_non_empty(&config.storage.database_path, "storage.database_path");
    require_non_empty(&config.cache.root, "cache.root");
    require_non_empty(&config.youtube.api_base_url, "youtube.api_base_url");
    require_non_empty(&config.youtube.ytdlp_binary, "youtube.ytdlp_binary");
    require_non_empty(&config.conversion.codec, "conversion.codec");
    require_non_empty(&config.conversion.bitrate, "conversion.bitrate");
    require_non_empty(&config.conversion.container, "conversion.container");

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` is not one of {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(binary) = &config.conversion.ffmpeg_binary
        && binary.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "conversion.ffmpeg_binary must not be empty when set".to_string(),
        });
    }

    if config.conversion.max_parallel < 1 {
        errors.push(ConfigError::Validation {
            message: "conversion.max_parallel must be at least 1".to_string(),
        });
    }

    if config.delivery.max_upload_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "delivery.max_upload_bytes must be positive".to_string(),
        });
    }

    if config.delivery.bytes_per_second_estimate == 0 {
        errors.push(ConfigError::Validation {
            message: "delivery.bytes_per_second_estimate must be positive".to_string(),
        });
    }

    if config.network.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "network.timeout_secs must be positive".to_string(),
        });
    }

    for chat in &config.telegram.allowed_chats {
        if chat.trim().parse::<i64>().is_err() {
            errors.push(ConfigError::Validation {
                message: format!("telegram.allowed_chats entry `{chat}` is not a numeric chat id"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks the credentials only the long-running service needs.
pub fn validate_for_serve(config: &TubecastConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let missing = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());

    if missing(&config.telegram.bot_token) {
        errors.push(ConfigError::MissingKey {
            key: "telegram.bot_token".to_string(),
        });
    }
    if missing(&config.youtube.api_key) {
        errors.push(ConfigError::MissingKey {
            key: "youtube.api_key".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
