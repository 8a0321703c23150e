// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ffmpeg-backed conversion engine.
//!
//! At most `max_parallel` ffmpeg processes run at once. The
//! [`AdmissionGate`] is a counter, not a queue: a caller at capacity waits
//! one optional interval, rechecks, and otherwise fails with
//! `ResourceExhausted`.

pub mod engine;
pub mod gate;
pub mod locate;
pub mod profile;

pub use engine::FfmpegEngine;
pub use gate::{AdmissionGate, Permit};
pub use locate::{locate_ffmpeg, FFMPEG_CANDIDATES};
pub use profile::ConversionProfile;
