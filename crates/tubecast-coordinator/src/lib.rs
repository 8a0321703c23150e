// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request coordination for tubecast.
//!
//! [`Coordinator`] turns a video id into a delivered audio message: it
//! deduplicates per channel, short-circuits on stored results, runs the
//! acquisition pipeline, and classifies failures. [`DispatchLoop`] feeds it
//! from an [`UpdateSource`](tubecast_core::UpdateSource).

pub mod caption;
pub mod classify;
pub mod command;
pub mod coordinator;
pub mod dispatch;
pub mod human;
pub mod inflight;
pub mod routing;
pub mod shutdown;

pub use classify::{classify, FailureClass};
pub use command::Command;
pub use coordinator::{Collaborators, Coordinator, CoordinatorSettings, Outcome};
pub use dispatch::DispatchLoop;
pub use inflight::{InFlightGuard, InFlightRegistry};
pub use shutdown::install_signal_handler;
