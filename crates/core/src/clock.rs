// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Milestone records store wall-clock unix seconds, with zero reserved for
//! "never set".

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that provides the current unix time in seconds
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> u64;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone, Debug)]
pub struct FakeClock {
    current: Arc<Mutex<u64>>,
}

impl FakeClock {
    /// Create a fake clock starting at an arbitrary non-zero time
    pub fn new() -> Self {
        Self::at(1_700_000_000)
    }

    /// Create a fake clock reading exactly `secs`
    pub fn at(secs: u64) -> Self {
        Self {
            current: Arc::new(Mutex::new(secs)),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += duration.as_secs();
    }

    /// Set the clock to a specific unix time
    pub fn set(&self, secs: u64) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = secs;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> u64 {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
