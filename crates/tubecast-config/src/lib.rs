// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered `tubecast.toml` configuration.
//!
//! Compiled defaults, then `/etc/tubecast`, the user config dir, and
//! `./tubecast.toml`, then `TUBECAST_<SECTION>_<KEY>` variables. Every
//! struct denies unknown fields; failures come back as [`ConfigError`]s
//! ready for [`render_errors`].

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TubecastConfig;
pub use validation::validate_for_serve;

/// Loads from the standard locations and validates.
pub fn load_and_validate() -> Result<TubecastConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || {
        loader::search_paths()
            .iter()
            .filter_map(|path| read_source(path))
            .collect()
    })
}

/// Loads one explicit file (plus env overrides) and validates.
pub fn load_and_validate_path(path: &Path) -> Result<TubecastConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Loads a TOML string and validates.
pub fn load_and_validate_str(toml_content: &str) -> Result<TubecastConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![(
            diagnostic::INLINE_SOURCE.to_string(),
            toml_content.to_string(),
        )]
    })
}

/// Sources are only read back when there is an error to point into.
fn checked(
    loaded: Result<TubecastConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<TubecastConfig, Vec<ConfigError>> {
    let config =
        loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// File content keyed by the absolute path figment records for it.
fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let absolute = if path.is_relative() {
        std::env::current_dir().ok()?.join(path)
    } else {
        path.to_path_buf()
    };
    Some((absolute.display().to_string(), content))
}
