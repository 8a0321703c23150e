// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment failures into miette reports that point into `tubecast.toml`.
//!
//! Unknown names are matched against [`SECTIONS`], so a typo gets a "did you
//! mean" and a key written under the wrong section is pointed at its real
//! home (`root` under `[storage]` suggests `cache.root`).

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a candidate must beat to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Name used for configuration parsed from a string.
pub const INLINE_SOURCE: &str = "<inline>";

/// Every section of `tubecast.toml` and the keys it accepts.
pub const SECTIONS: &[(&str, &[&str])] = &[
    ("service", &["log_level"]),
    ("telegram", &["bot_token", "allowed_chats"]),
    (
        "youtube",
        &["api_key", "api_base_url", "ytdlp_binary", "audio_format"],
    ),
    ("storage", &["database_path", "wal_mode"]),
    ("cache", &["root"]),
    (
        "conversion",
        &[
            "ffmpeg_binary",
            "max_parallel",
            "wait_timeout_ms",
            "codec",
            "bitrate",
            "container",
        ],
    ),
    ("delivery", &["max_upload_bytes", "bytes_per_second_estimate"]),
    ("network", &["max_redirects", "timeout_secs"]),
];

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown section `[{name}]`")]
    #[diagnostic(
        code(tubecast::config::unknown_section),
        help("{}", section_help(suggestion.as_deref()))
    )]
    UnknownSection {
        name: String,
        suggestion: Option<String>,
        #[label("not a tubecast section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key its section does not accept. `suggestion` is either a sibling
    /// key or a dotted `section.key` when the key belongs elsewhere.
    #[error("unknown key `{key}` in `[{section}]`")]
    #[diagnostic(
        code(tubecast::config::unknown_key),
        help("{}", key_help(section, suggestion.as_deref()))
    )]
    UnknownKey {
        section: String,
        key: String,
        suggestion: Option<String>,
        #[label("not accepted here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(tubecast::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A setting that only some commands need.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(tubecast::config::missing_key),
        help("set it in tubecast.toml or export {}", env_var_name(key))
    )]
    MissingKey { key: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(tubecast::config::validation))]
    Validation { message: String },

    /// Syntax errors and anything else figment reports.
    #[error("could not read configuration: {0}")]
    #[diagnostic(code(tubecast::config::unreadable))]
    Unreadable(String),
}

fn section_help(suggestion: Option<&str>) -> String {
    let names: Vec<&str> = SECTIONS.iter().map(|(name, _)| *name).collect();
    match suggestion {
        Some(s) => format!("did you mean `[{s}]`? Sections: {}", names.join(", ")),
        None => format!("sections: {}", names.join(", ")),
    }
}

fn key_help(section: &str, suggestion: Option<&str>) -> String {
    let keys = keys_of(section).join(", ");
    match suggestion {
        Some(s) if s.contains('.') => format!("`{s}` is set in its own section"),
        Some(s) => format!("did you mean `{s}`? `[{section}]` accepts: {keys}"),
        None => format!("`[{section}]` accepts: {keys}"),
    }
}

/// Environment variable that overrides a dotted key.
pub fn env_var_name(key: &str) -> String {
    format!("TUBECAST_{}", key.replace('.', "_").to_ascii_uppercase())
}

fn keys_of(section: &str) -> &'static [&'static str] {
    SECTIONS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, keys)| *keys)
        .unwrap_or_default()
}

fn closest<'a>(unknown: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), candidate))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate)
}

/// Closest section name to a misspelled one.
pub fn suggest_section(unknown: &str) -> Option<String> {
    closest(unknown, SECTIONS.iter().map(|(name, _)| *name)).map(str::to_string)
}

/// Suggestion for a key `section` rejected.
///
/// An exact match in another section wins over a near miss in this one.
pub fn suggest_key(section: &str, unknown: &str) -> Option<String> {
    if let Some((home, _)) = SECTIONS
        .iter()
        .find(|(name, keys)| *name != section && keys.contains(&unknown))
    {
        return Some(format!("{home}.{unknown}"));
    }
    closest(unknown, keys_of(section).iter().copied()).map(str::to_string)
}

/// Converts every error figment collected.
///
/// `sources` pairs a display path with file content; configuration parsed
/// from a string is looked up under [`INLINE_SOURCE`].
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let source = source_of(&error, sources);
            match &error.kind {
                Kind::UnknownField(name, _) if error.path.is_empty() => {
                    let (span, src) = locate(source, None, name);
                    ConfigError::UnknownSection {
                        name: name.clone(),
                        suggestion: suggest_section(name),
                        span,
                        src,
                    }
                }
                Kind::UnknownField(key, _) => {
                    let section = error.path.join(".");
                    let (span, src) = locate(source, Some(section.as_str()), key);
                    ConfigError::UnknownKey {
                        suggestion: suggest_key(&section, key),
                        section,
                        key: key.clone(),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(found, expected) | Kind::InvalidValue(found, expected) => {
                    let (span, src) = match error.path.as_slice() {
                        [section, key] => locate(source, Some(section.as_str()), key),
                        _ => (None, None),
                    };
                    ConfigError::InvalidType {
                        key: error.path.join("."),
                        found: found.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Unreadable(error.to_string()),
            }
        })
        .collect()
}

/// Content of the file (or inline string) an error came from.
fn source_of<'a>(
    error: &figment::Error,
    sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let wanted = match error.metadata.as_ref().and_then(|m| m.source.as_ref()) {
        Some(figment::Source::File(path)) => path.display().to_string(),
        Some(figment::Source::Code(_)) => INLINE_SOURCE.to_string(),
        _ => return None,
    };
    sources
        .iter()
        .find(|(path, _)| *path == wanted)
        .map(|(path, content)| (path.as_str(), content.as_str()))
}

fn locate(
    source: Option<(&str, &str)>,
    section: Option<&str>,
    name: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some((path, content)) = source else {
        return (None, None);
    };
    let offset = match section {
        Some(section) => find_key_offset(content, section, name),
        None => find_section_offset(content, name),
    };
    match offset {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), name.len())),
            Some(NamedSource::new(path, content.to_string())),
        ),
        None => (None, None),
    }
}

/// Byte offset of the name inside a `[section]` header line.
pub fn find_section_offset(content: &str, section: &str) -> Option<usize> {
    let header = format!("[{section}]");
    lines_with_offsets(content)
        .find(|(_, line)| line.trim() == header)
        .map(|(start, line)| start + line.find(section).unwrap_or_default())
}

/// Byte offset of `key` inside `[section]`, stopping at the next header.
pub fn find_key_offset(content: &str, section: &str, key: &str) -> Option<usize> {
    let header = format!("[{section}]");
    let mut inside = false;
    for (start, line) in lines_with_offsets(content) {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            inside = trimmed.trim_end() == header;
            continue;
        }
        if !inside {
            continue;
        }
        let Some(rest) = trimmed.strip_prefix(key) else {
            continue;
        };
        if rest.trim_start().starts_with('=') {
            return Some(start + line.len() - trimmed.len());
        }
    }
    None
}

fn lines_with_offsets(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content.split_inclusive('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line.trim_end_matches(['\r', '\n'])))
    })
}

/// Prints each error as a miette report on stderr.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        match handler.render_report(&mut report, error) {
            Ok(()) => eprint!("{report}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
