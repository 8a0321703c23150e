// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for tubecast.
//!
//! Stores one row per video id in `audios` and appends every write to
//! `history`. All access goes through `tokio-rusqlite`'s single background
//! thread, so writes are serialized without extra locking.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
