// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifetime monitor: kills milestone processes that stop reporting or run
//! past their budget.
//!
//! Candidates are collected under the registry lock; signals are sent after
//! the lock is released.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wp_adapters::{ProcessAdapter, ProcessError};
use wp_core::{AuditLog, Clock, Milestone, MilestoneLifetimeConfig, OverdueReason, RegistryHandle};

/// What happened to an overdue milestone's process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The process was alive and has been killed
    Killed,
    /// The process had already exited
    AlreadyGone,
    /// The kill signal could not be delivered
    KillFailed(String),
}

/// One overdue milestone handled by a poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaped {
    pub milestone: Milestone,
    pub process_id: u32,
    pub reason: OverdueReason,
    pub termination: Termination,
    /// Whether the registry record moved to `Failed`
    pub failed: bool,
}

pub struct LifetimeMonitor<P: ProcessAdapter, C: Clock> {
    registry: RegistryHandle,
    audit: AuditLog,
    processes: P,
    clock: C,
    limits: MilestoneLifetimeConfig,
}

impl<P: ProcessAdapter, C: Clock> LifetimeMonitor<P, C> {
    pub fn new(
        registry: RegistryHandle,
        audit: AuditLog,
        processes: P,
        clock: C,
        limits: MilestoneLifetimeConfig,
    ) -> Self {
        Self {
            registry,
            audit,
            processes,
            clock,
            limits,
        }
    }

    /// Poll every `poll_interval` until `token` is cancelled
    pub async fn run(self, token: CancellationToken) {
        info!(
            poll_secs = self.limits.poll_interval.as_secs(),
            max_dwell_secs = self.limits.max_update_dwell_time.as_secs(),
            max_run_secs = self.limits.max_run_time.as_secs(),
            "lifetime monitor started"
        );

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.limits.poll_interval) => {
                    self.poll_once().await;
                }
            }
        }

        info!("lifetime monitor stopped");
    }

    /// Inspect the registry once and terminate every overdue milestone
    pub async fn poll_once(&self) -> Vec<Reaped> {
        let now = self.clock.now();
        let overdue = self.registry.with(|r| r.overdue(now, &self.limits));
        if overdue.is_empty() {
            return Vec::new();
        }

        let mut reaped = Vec::with_capacity(overdue.len());
        for candidate in overdue {
            let milestone = candidate.milestone;
            let pid = candidate.process_id;
            match candidate.reason {
                OverdueReason::Dwell(secs) => {
                    info!(%milestone, pid, dwell_secs = secs, "milestone stopped reporting")
                }
                OverdueReason::RunTime(secs) => {
                    info!(%milestone, pid, run_secs = secs, "milestone exceeded its run time")
                }
            }

            let termination = self.terminate(pid).await;
            let failed = match &termination {
                Termination::Killed => {
                    warn!(%milestone, pid, "milestone was forcefully killed");
                    self.audit
                        .warn(&format!("Milestone {} was forcefully killed", milestone));
                    self.registry.with(|r| r.fail_killed(milestone, pid))
                }
                Termination::KillFailed(error) => {
                    warn!(%milestone, pid, error = %error, "could not kill milestone process");
                    self.audit.warn(&format!(
                        "Milestone {} could not be killed: {}",
                        milestone, error
                    ));
                    self.registry.with(|r| r.fail_killed(milestone, pid))
                }
                Termination::AlreadyGone => {
                    debug!(%milestone, pid, "milestone process already exited");
                    self.registry.with(|r| r.fail_abandoned(milestone, pid))
                }
            };

            reaped.push(Reaped {
                milestone,
                process_id: pid,
                reason: candidate.reason,
                termination,
                failed,
            });
        }
        reaped
    }

    async fn terminate(&self, pid: u32) -> Termination {
        // A failed lookup is treated as an exited process
        match self.processes.is_alive(pid).await {
            Ok(true) => {}
            Ok(false) => return Termination::AlreadyGone,
            Err(e) => {
                debug!(pid, error = %e, "process lookup failed");
                return Termination::AlreadyGone;
            }
        }

        match self.processes.kill(pid).await {
            Ok(()) => Termination::Killed,
            Err(ProcessError::NotFound(_)) => Termination::AlreadyGone,
            Err(e) => Termination::KillFailed(e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
