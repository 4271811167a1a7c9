// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness thresholds for the lifetime monitor

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a milestone may stay quiet or run before it is killed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneLifetimeConfig {
    /// Longest allowed gap between heartbeats
    #[serde(with = "humantime_serde")]
    pub max_update_dwell_time: Duration,
    /// Longest allowed run, measured from activation
    #[serde(with = "humantime_serde")]
    pub max_run_time: Duration,
    /// How often the monitor inspects the registry
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for MilestoneLifetimeConfig {
    fn default() -> Self {
        Self {
            max_update_dwell_time: Duration::from_secs(5 * 60),
            max_run_time: Duration::from_secs(2 * 60 * 60),
            poll_interval: Duration::from_secs(10),
        }
    }
}

impl MilestoneLifetimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_update_dwell_time.is_zero() {
            return Err(ConfigError::Invalid(
                "max_update_dwell_time must be greater than zero".to_string(),
            ));
        }
        if self.max_run_time.is_zero() {
            return Err(ConfigError::Invalid(
                "max_run_time must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval > self.max_update_dwell_time {
            return Err(ConfigError::Invalid(format!(
                "poll_interval ({}) exceeds max_update_dwell_time ({})",
                humantime::format_duration(self.poll_interval),
                humantime::format_duration(self.max_update_dwell_time)
            )));
        }
        Ok(())
    }
}
