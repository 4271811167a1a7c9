// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS process adapters used by the lifetime monitor

mod signal;

pub use signal::SignalProcessAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcess, FakeProcessAdapter, ProcessCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from process operations
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("process {0} not found")]
    NotFound(u32),
    #[error("not permitted to signal process {0}")]
    PermissionDenied(u32),
    #[error("signal to process {pid} failed: {message}")]
    Failed { pid: u32, message: String },
}

/// Adapter for inspecting and terminating OS processes by pid
#[async_trait]
pub trait ProcessAdapter: Clone + Send + Sync + 'static {
    /// Whether a process with this pid currently exists
    async fn is_alive(&self, pid: u32) -> Result<bool, ProcessError>;

    /// Force-terminate the process
    async fn kill(&self, pid: u32) -> Result<(), ProcessError>;
}
