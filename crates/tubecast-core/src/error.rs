// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for tubecast.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across all tubecast adapters and pipeline stages.
///
/// Lower-level components (cache, engine, store) only ever return these typed
/// failures. Turning them into user-facing text is the coordinator's job.
#[derive(Debug, Error)]
pub enum TubecastError {
    /// Malformed request (empty id, unparseable reference).
    #[error("invalid input: {0}")]
    Input(String),

    /// A bounded resource is at capacity or an allocation budget ran out.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The source refused the content with a client-error status.
    #[error("content unavailable: {message}")]
    ContentUnavailable { message: String },

    /// Unclassified conversion or upload failure.
    #[error("pipeline failure: {message}")]
    Pipeline {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No record exists for the requested id.
    #[error("no record for id `{id}`")]
    NotFound { id: String },

    /// A collaborator (messaging gateway, metadata provider, network) failed.
    #[error("{service} error: {message}")]
    External {
        service: &'static str,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A path resolved outside the cache root.
    #[error("refusing to touch `{}`: not inside the cache root", path.display())]
    OutsideCache { path: PathBuf },

    /// Configuration errors (missing token, binary not found).
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TubecastError {
    /// Shorthand for a pipeline failure without an underlying source.
    pub fn pipeline(message: impl Into<String>) -> Self {
        Self::Pipeline {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a collaborator failure wrapping its source error.
    pub fn external<E>(service: &'static str, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::External {
            service,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// True when the failure came from a capacity limit rather than the content.
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }
}
