// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Milestones and their per-run status records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named stage of the pipeline. The set is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Milestone {
    InitialSetup,
    Sync,
}

impl Milestone {
    /// Every known milestone, in pipeline order
    pub const ALL: [Milestone; 2] = [Milestone::InitialSetup, Milestone::Sync];

    pub fn name(&self) -> &'static str {
        match self {
            Milestone::InitialSetup => "InitialSetup",
            Milestone::Sync => "Sync",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error parsing a milestone or condition name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown milestone: {0}")]
    UnknownMilestone(String),
    #[error("unknown condition: {0}")]
    UnknownCondition(String),
}

impl FromStr for Milestone {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Milestone::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownMilestone(s.to_string()))
    }
}

/// Lifecycle condition of a milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MilestoneCondition {
    #[default]
    NotStarted,
    Running,
    Completed,
    Failed,
    Blocked,
}

impl MilestoneCondition {
    /// Conditions the lifetime monitor watches
    pub fn is_monitored(&self) -> bool {
        matches!(self, MilestoneCondition::Running | MilestoneCondition::Completed)
    }

    /// Terminal for the current run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MilestoneCondition::Completed | MilestoneCondition::Failed | MilestoneCondition::Blocked
        )
    }

    /// Whether an explicit status report may move a milestone from `self` to `next`.
    ///
    /// `Blocked` is only left by restarting the daemon, and nothing returns to
    /// `NotStarted`.
    pub fn can_transition_to(&self, next: MilestoneCondition) -> bool {
        use MilestoneCondition::*;
        match (self, next) {
            (_, NotStarted) => *self == NotStarted,
            (Blocked, other) => other == Blocked,
            (_, Blocked) | (_, Running) => true,
            (Running | Completed, Completed) => true,
            (Running | Completed | Failed, Failed) => true,
            _ => false,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MilestoneCondition::NotStarted => "NotStarted",
            MilestoneCondition::Running => "Running",
            MilestoneCondition::Completed => "Completed",
            MilestoneCondition::Failed => "Failed",
            MilestoneCondition::Blocked => "Blocked",
        }
    }
}

impl fmt::Display for MilestoneCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MilestoneCondition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use MilestoneCondition::*;
        [NotStarted, Running, Completed, Failed, Blocked]
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownCondition(s.to_string()))
    }
}

/// Status record for one milestone
///
/// Timestamps are unix seconds; zero means unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MilestoneStatus {
    pub condition: MilestoneCondition,
    pub process_id: u32,
    pub start_time: u64,
    pub last_update: u64,
}

impl MilestoneStatus {
    /// Seconds since the last heartbeat
    pub fn dwell_time(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_update)
    }

    /// Seconds since the current lifecycle started
    pub fn run_time(&self, now: u64) -> u64 {
        now.saturating_sub(self.start_time)
    }

    /// Has a live owner and both timestamps recorded
    pub fn is_tracked(&self) -> bool {
        self.condition.is_monitored()
            && self.process_id != 0
            && self.start_time != 0
            && self.last_update != 0
    }

    /// Refresh `last_update` without letting it move backwards
    pub(crate) fn touch(&mut self, now: u64) {
        self.last_update = self.last_update.max(now);
        if self.start_time == 0 {
            self.start_time = self.last_update;
        }
    }
}

#[cfg(test)]
#[path = "milestone_tests.rs"]
mod tests;
