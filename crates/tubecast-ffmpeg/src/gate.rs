// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Counting admission gate for external processes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tracing::debug;
use tubecast_core::TubecastError;

/// Bounds how many holders may be active at once.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    active: AtomicUsize,
}

/// Occupies one gate slot until dropped.
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            active: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Takes a slot if one is free right now.
    pub fn try_admit(&self) -> Option<Permit<'_>> {
        let mut current = self.active.load(Ordering::Acquire);
        loop {
            if current >= self.capacity {
                return None;
            }
            match self.active.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(Permit { gate: self }),
                Err(observed) => current = observed,
            }
        }
    }

    /// Takes a slot, sleeping once for `wait` before a single recheck.
    pub async fn admit(&self, wait: Option<Duration>) -> Result<Permit<'_>, TubecastError> {
        if let Some(permit) = self.try_admit() {
            return Ok(permit);
        }
        if let Some(wait) = wait {
            debug!(wait_ms = wait.as_millis() as u64, "gate full, waiting once");
            tokio::time::sleep(wait).await;
            if let Some(permit) = self.try_admit() {
                return Ok(permit);
            }
        }
        Err(TubecastError::ResourceExhausted(format!(
            "max number of ffmpeg processes ({}) already running",
            self.capacity
        )))
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.active.fetch_sub(1, Ordering::AcqRel);
    }
}
