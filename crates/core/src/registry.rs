// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intelligence registry: the in-memory record of every milestone's status
//!
//! `Registry` is a plain state machine; callers pass in the current time.
//! `RegistryHandle` is the shared, mutex-guarded handle that the daemon
//! constructs once and injects into the RPC facade and the lifetime monitor.

use crate::config::MilestoneLifetimeConfig;
use crate::milestone::{Milestone, MilestoneCondition, MilestoneStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown milestone: {0}")]
    UnknownMilestone(String),
}

/// Result of an activation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivateOutcome {
    /// The milestone is now running under the caller's pid
    Activated,
    /// Another process still held the milestone as running; the caller replaced it
    TookOver { previous_pid: u32 },
    /// The milestone is blocked; nothing changed
    Blocked,
}

/// Result of a status update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// Name is not part of the fixed milestone set
    UnknownMilestone,
    /// The state machine does not allow this transition
    Rejected {
        from: MilestoneCondition,
        to: MilestoneCondition,
    },
}

/// Why a milestone is past its liveness budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverdueReason {
    /// No heartbeat for this many seconds
    Dwell(u64),
    /// Running for this many seconds
    RunTime(u64),
}

/// A milestone whose owning process should be terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overdue {
    pub milestone: Milestone,
    pub process_id: u32,
    pub reason: OverdueReason,
}

/// Status of every milestone, keyed by milestone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    milestones: BTreeMap<Milestone, MilestoneStatus>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            milestones: Milestone::ALL
                .into_iter()
                .map(|m| (m, MilestoneStatus::default()))
                .collect(),
        }
    }

    /// Look up a milestone by name
    pub fn get(&self, name: &str) -> Result<MilestoneStatus, RegistryError> {
        let milestone = name
            .parse::<Milestone>()
            .map_err(|_| RegistryError::UnknownMilestone(name.to_string()))?;
        Ok(self.status(milestone))
    }

    pub fn status(&self, milestone: Milestone) -> MilestoneStatus {
        self.milestones.get(&milestone).copied().unwrap_or_default()
    }

    fn entry(&mut self, milestone: Milestone) -> &mut MilestoneStatus {
        self.milestones.entry(milestone).or_default()
    }

    /// Mark a milestone as running under `pid`
    pub fn activate(&mut self, milestone: Milestone, pid: u32, now: u64) -> ActivateOutcome {
        let status = self.entry(milestone);
        if status.condition == MilestoneCondition::Blocked {
            return ActivateOutcome::Blocked;
        }

        let previous = *status;
        let outcome = if previous.condition == MilestoneCondition::Running
            && previous.process_id != 0
            && previous.process_id != pid
        {
            ActivateOutcome::TookOver {
                previous_pid: previous.process_id,
            }
        } else {
            ActivateOutcome::Activated
        };

        claim(status, pid, now);
        status.condition = MilestoneCondition::Running;
        status.touch(now);
        outcome
    }

    /// Apply a status report from a milestone process
    pub fn update_status(
        &mut self,
        name: &str,
        condition: MilestoneCondition,
        pid: u32,
        now: u64,
    ) -> UpdateOutcome {
        let Ok(milestone) = name.parse::<Milestone>() else {
            return UpdateOutcome::UnknownMilestone;
        };

        let status = self.entry(milestone);
        if !status.condition.can_transition_to(condition) {
            return UpdateOutcome::Rejected {
                from: status.condition,
                to: condition,
            };
        }

        claim(status, pid, now);
        status.condition = condition;
        status.touch(now);
        UpdateOutcome::Applied
    }

    /// Operator kill-switch: block every milestone
    pub fn block_all(&mut self) {
        for status in self.milestones.values_mut() {
            status.condition = MilestoneCondition::Blocked;
        }
    }

    /// Copy of every record
    pub fn snapshot(&self) -> BTreeMap<Milestone, MilestoneStatus> {
        self.milestones.clone()
    }

    /// Milestones whose owner has gone quiet or overrun its budget
    pub fn overdue(&self, now: u64, limits: &MilestoneLifetimeConfig) -> Vec<Overdue> {
        let max_dwell = limits.max_update_dwell_time.as_secs();
        let max_run = limits.max_run_time.as_secs();

        self.milestones
            .iter()
            .filter(|(_, status)| status.is_tracked())
            .filter_map(|(milestone, status)| {
                let dwell = status.dwell_time(now);
                let run = status.run_time(now);
                let reason = if dwell > max_dwell {
                    OverdueReason::Dwell(dwell)
                } else if run > max_run {
                    OverdueReason::RunTime(run)
                } else {
                    return None;
                };
                Some(Overdue {
                    milestone: *milestone,
                    process_id: status.process_id,
                    reason,
                })
            })
            .collect()
    }

    /// Fail a milestone whose process was terminated.
    ///
    /// Only applies while `pid` still owns a monitored record.
    pub fn fail_killed(&mut self, milestone: Milestone, pid: u32) -> bool {
        let status = self.entry(milestone);
        if status.process_id != pid || !status.condition.is_monitored() {
            return false;
        }
        status.condition = MilestoneCondition::Failed;
        true
    }

    /// Fail a milestone whose process had already exited.
    ///
    /// A `Completed` record is left alone.
    pub fn fail_abandoned(&mut self, milestone: Milestone, pid: u32) -> bool {
        let status = self.entry(milestone);
        if status.process_id != pid || status.condition != MilestoneCondition::Running {
            return false;
        }
        status.condition = MilestoneCondition::Failed;
        true
    }

    /// Count milestones in a given condition
    pub fn count(&self, condition: MilestoneCondition) -> usize {
        self.milestones
            .values()
            .filter(|s| s.condition == condition)
            .count()
    }
}

/// Record `pid` as the owner; a different owner starts a new lifecycle.
fn claim(status: &mut MilestoneStatus, pid: u32, now: u64) {
    if status.process_id != 0 && pid != 0 && status.process_id != pid {
        status.start_time = now;
        status.last_update = now;
    }
    status.process_id = pid;
}

/// Shared registry handle
#[derive(Clone, Default)]
pub struct RegistryHandle {
    inner: Arc<Mutex<Registry>>,
}

impl RegistryHandle {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Run `f` with the registry locked. Keep `f` free of I/O.
    pub fn with<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        let mut registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut registry)
    }

    pub fn snapshot(&self) -> BTreeMap<Milestone, MilestoneStatus> {
        self.with(|r| r.snapshot())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
