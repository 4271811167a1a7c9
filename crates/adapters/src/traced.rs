// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::process::{ProcessAdapter, ProcessError};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any ProcessAdapter
#[derive(Clone)]
pub struct TracedProcessAdapter<P> {
    inner: P,
}

impl<P> TracedProcessAdapter<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: ProcessAdapter> ProcessAdapter for TracedProcessAdapter<P> {
    async fn is_alive(&self, pid: u32) -> Result<bool, ProcessError> {
        let result = self.inner.is_alive(pid).await;
        tracing::trace!(pid, alive = ?result.as_ref().ok(), "checked");
        result
    }

    async fn kill(&self, pid: u32) -> Result<(), ProcessError> {
        let span = tracing::info_span!("process.kill", pid);

        async {
            let start = std::time::Instant::now();
            let result = self.inner.kill(pid).await;
            let elapsed = start.elapsed();

            // NotFound is expected when the process exited on its own
            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "killed"),
                Err(ProcessError::NotFound(_)) => tracing::debug!("already gone"),
                Err(e) => tracing::warn!(error = %e, "kill failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
