// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process adapter backed by POSIX signals

use super::{ProcessAdapter, ProcessError};
use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// Probes with signal 0 and terminates with SIGKILL
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalProcessAdapter;

impl SignalProcessAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Reject pids that would address a process group or every process
fn to_pid(pid: u32) -> Result<Pid, ProcessError> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(ProcessError::NotFound(pid)),
    }
}

#[async_trait]
impl ProcessAdapter for SignalProcessAdapter {
    async fn is_alive(&self, pid: u32) -> Result<bool, ProcessError> {
        let Ok(target) = to_pid(pid) else {
            return Ok(false);
        };
        match signal::kill(target, None) {
            Ok(()) => Ok(true),
            // Exists but belongs to someone else
            Err(Errno::EPERM) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(e) => Err(ProcessError::Failed {
                pid,
                message: e.to_string(),
            }),
        }
    }

    async fn kill(&self, pid: u32) -> Result<(), ProcessError> {
        let target = to_pid(pid)?;
        match signal::kill(target, Signal::SIGKILL) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => Err(ProcessError::NotFound(pid)),
            Err(Errno::EPERM) => Err(ProcessError::PermissionDenied(pid)),
            Err(e) => Err(ProcessError::Failed {
                pid,
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
