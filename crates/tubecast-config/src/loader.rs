// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tubecast.toml` > `~/.config/tubecast/tubecast.toml`
//! > `/etc/tubecast/tubecast.toml` with environment variable overrides via the
//! `TUBECAST_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::diagnostic::SECTIONS;
use crate::model::TubecastConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tubecast/tubecast.toml`
/// 3. `~/.config/tubecast/tubecast.toml`
/// 4. `./tubecast.toml`
/// 5. `TUBECAST_*` environment variables
pub fn load_config() -> Result<TubecastConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TubecastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TubecastConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TubecastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TubecastConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(TubecastConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Config files in merge order, lowest precedence first.
pub(crate) fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/tubecast/tubecast.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("tubecast/tubecast.toml"));
    }
    paths.push(PathBuf::from("tubecast.toml"));
    paths
}

/// Environment provider with explicit section mapping.
///
/// `Env::split("_")` would turn `TUBECAST_TELEGRAM_BOT_TOKEN` into
/// `telegram.bot.token`; only the first underscore after a known section
/// becomes a dot.
fn env_provider() -> Env {
    Env::prefixed("TUBECAST_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for &(section, _) in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
