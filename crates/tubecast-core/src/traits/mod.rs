// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for every pipeline seam.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod gateway;
pub mod loader;
pub mod metadata;
pub mod storage;
pub mod transcoder;

pub use adapter::PluginAdapter;
pub use gateway::{MessagingGateway, UpdateSource};
pub use loader::NetworkLoader;
pub use metadata::MetadataProvider;
pub use storage::AudioStore;
pub use transcoder::Transcoder;
