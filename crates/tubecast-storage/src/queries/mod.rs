// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the audio and history tables.

pub mod audios;
pub mod history;
