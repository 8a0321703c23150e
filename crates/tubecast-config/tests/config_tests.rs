// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the tubecast configuration system.

use serial_test::serial;
use tubecast_config::diagnostic::ConfigError;
use tubecast_config::model::TubecastConfig;
use tubecast_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[service]
log_level = "debug"

[telegram]
bot_token = "123:ABC"
allowed_chats = ["42", "-100500"]

[youtube]
api_key = "yt-key"
ytdlp_binary = "/opt/yt-dlp"

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[cache]
root = "/tmp/tubecast-cache"

[conversion]
ffmpeg_binary = "/usr/bin/ffmpeg"
max_parallel = 2
wait_timeout_ms = 250
bitrate = "128k"

[delivery]
max_upload_bytes = 1000

[network]
max_redirects = 3
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.allowed_chats, vec!["42", "-100500"]);
    assert_eq!(config.youtube.api_key.as_deref(), Some("yt-key"));
    assert_eq!(config.youtube.ytdlp_binary, "/opt/yt-dlp");
    assert_eq!(config.youtube.audio_format, "bestaudio");
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.cache.root, "/tmp/tubecast-cache");
    assert_eq!(config.conversion.ffmpeg_binary.as_deref(), Some("/usr/bin/ffmpeg"));
    assert_eq!(config.conversion.max_parallel, 2);
    assert_eq!(config.conversion.wait_timeout_ms, Some(250));
    assert_eq!(config.conversion.bitrate, "128k");
    assert_eq!(config.conversion.codec, "aac");
    assert_eq!(config.delivery.max_upload_bytes, 1000);
    assert_eq!(config.delivery.bytes_per_second_estimate, 20_634);
    assert_eq!(config.network.max_redirects, 3);
    assert_eq!(config.network.timeout_secs, 60);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.service.log_level, "info");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.telegram.allowed_chats.is_empty());
    assert!(config.youtube.api_key.is_none());
    assert_eq!(config.youtube.ytdlp_binary, "yt-dlp");
    assert!(config.storage.wal_mode);
    assert_eq!(config.cache.root, "./cache");
    assert!(config.conversion.ffmpeg_binary.is_none());
    assert_eq!(config.conversion.max_parallel, 6);
    assert!(config.conversion.wait_timeout_ms.is_none());
    assert_eq!(config.conversion.container, "ipod");
    assert_eq!(config.delivery.max_upload_bytes, 52_428_800);
    assert_eq!(config.network.max_redirects, 5);
}

/// Unknown field in [conversion] is rejected.
#[test]
fn unknown_field_in_conversion_produces_error() {
    let toml = r#"
[conversion]
max_paralel = 3
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("max_paralel"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// The diagnostic for a typo names the key and suggests the right one.
#[test]
fn diagnostic_suggests_correction_for_typo() {
    let toml = r#"
[telegram]
bot_tken = "abc"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "bot_tken" && suggestion.as_deref() == Some("bot_token")
        )
    });
    assert!(found, "expected a bot_token suggestion, got: {errors:?}");
}

/// A key under the wrong section points at the section that owns it.
#[test]
fn misplaced_key_names_its_section() {
    let toml = r#"
[storage]
root = "/srv/cache"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { section, key, suggestion, .. }
                if section == "storage" && key == "root"
                    && suggestion.as_deref() == Some("cache.root")
        )
    });
    assert!(found, "expected a cache.root suggestion, got: {errors:?}");
}

/// A misspelled section is reported as a section, not as a key.
#[test]
#[serial]
fn unknown_section_is_located_in_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tubecast.toml");
    let content = "[cache]\nroot = \"/c\"\n\n[conversions]\nmax_parallel = 2\n";
    std::fs::write(&path, content).expect("write config");

    let errors = load_and_validate_path(&path).expect_err("should fail");
    match errors.as_slice() {
        [ConfigError::UnknownSection { name, suggestion, span, src }] => {
            assert_eq!(name, "conversions");
            assert_eq!(suggestion.as_deref(), Some("conversion"));
            let span = span.as_ref().expect("span");
            assert_eq!(&content[span.offset()..span.offset() + span.len()], "conversions");
            assert!(src.is_some());
        }
        other => panic!("expected one unknown section, got: {other:?}"),
    }
}

/// Wrong value types are reported with the dotted key and a span on it.
#[test]
#[serial]
fn wrong_type_is_located_in_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tubecast.toml");
    let content = "[cache]\nroot = \"/c\"\n\n[conversion]\nmax_parallel = \"six\"\n";
    std::fs::write(&path, content).expect("write config");

    let errors = load_and_validate_path(&path).expect_err("should fail");
    match errors.as_slice() {
        [ConfigError::InvalidType { key, span, .. }] => {
            assert_eq!(key, "conversion.max_parallel");
            let span = span.as_ref().expect("span");
            assert_eq!(&content[span.offset()..span.offset() + span.len()], "max_parallel");
        }
        other => panic!("expected one type error, got: {other:?}"),
    }
}

/// Broken TOML syntax is reported as unreadable.
#[test]
fn syntax_error_is_unreadable() {
    let errors = load_and_validate_str("[cache\nroot = ").expect_err("should fail");
    assert!(
        errors.iter().any(|e| matches!(e, ConfigError::Unreadable(_))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_surface_from_str_loader() {
    let toml = r#"
[conversion]
max_parallel = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero parallelism is invalid");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("max_parallel"))));
}

/// Missing config files are silently skipped.
#[test]
#[serial]
fn missing_config_file_is_skipped() {
    let config = load_config_from_path(std::path::Path::new("/nonexistent/tubecast.toml"))
        .expect("missing file should be silently skipped");
    assert_eq!(config.conversion.max_parallel, 6);
}

/// A file on disk loads and validates.
#[test]
#[serial]
fn config_file_loads_from_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tubecast.toml");
    std::fs::write(&path, "[cache]\nroot = \"/var/cache/tubecast\"\n").expect("write config");

    let config = load_and_validate_path(&path).expect("file config should validate");
    assert_eq!(config.cache.root, "/var/cache/tubecast");
}

/// `TUBECAST_TELEGRAM_BOT_TOKEN` maps to `telegram.bot_token`, not `telegram.bot.token`.
#[test]
#[serial]
fn env_var_overrides_file_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tubecast.toml");
    std::fs::write(&path, "[conversion]\nmax_parallel = 2\n").expect("write config");

    // SAFETY: serialized with every other env-reading test in this binary.
    unsafe {
        std::env::set_var("TUBECAST_TELEGRAM_BOT_TOKEN", "xyz-from-env");
        std::env::set_var("TUBECAST_CONVERSION_MAX_PARALLEL", "4");
    }
    let result = load_config_from_path(&path);
    unsafe {
        std::env::remove_var("TUBECAST_TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TUBECAST_CONVERSION_MAX_PARALLEL");
    }

    let config = result.expect("env override should merge");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("xyz-from-env"));
    assert_eq!(config.conversion.max_parallel, 4);
}

/// Serialized defaults round-trip through TOML.
#[test]
fn defaults_serialize_to_loadable_toml() {
    let rendered = toml::to_string(&TubecastConfig::default()).expect("serialize defaults");
    let config = load_config_from_str(&rendered).expect("rendered defaults should load");
    assert_eq!(config.cache.root, "./cache");
}
