// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for tubecast integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic tests
//! that need neither Telegram, YouTube nor ffmpeg.
//!
//! # Components
//!
//! - [`MockGateway`] - captures outbound messages, injects inbound ones
//! - [`MockMetadata`] - scripted video metadata and audio streams
//! - [`MockLoader`] - serves thumbnails from a scratch directory
//! - [`MockTranscoder`] - copies streams to disk with scripted failures
//! - [`TestHarness`] - a coordinator wired to all of the above and SQLite

pub mod harness;
pub mod mock_gateway;
pub mod mock_loader;
pub mod mock_metadata;
pub mod mock_transcoder;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_gateway::{MockGateway, Sent};
pub use mock_loader::{MockLoader, PNG_BYTES};
pub use mock_metadata::{sample_video, MockMetadata, StreamScript};
pub use mock_transcoder::{MockTranscoder, TagCall};
