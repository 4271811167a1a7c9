// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProcessAdapter, ProcessError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded process call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessCall {
    IsAlive { pid: u32 },
    Kill { pid: u32 },
}

/// Fake process state
#[derive(Debug, Clone, Default)]
pub struct FakeProcess {
    pub alive: bool,
    /// Kill attempts fail with `PermissionDenied`
    pub deny_kill: bool,
}

/// Fake process adapter for testing
#[derive(Clone, Default)]
pub struct FakeProcessAdapter {
    processes: Arc<Mutex<HashMap<u32, FakeProcess>>>,
    calls: Arc<Mutex<Vec<ProcessCall>>>,
}

impl FakeProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live process
    pub fn spawn(&self, pid: u32) {
        self.processes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                pid,
                FakeProcess {
                    alive: true,
                    deny_kill: false,
                },
            );
    }

    /// Mark a process as exited
    pub fn exit(&self, pid: u32) {
        if let Some(process) = self
            .processes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&pid)
        {
            process.alive = false;
        }
    }

    /// Make kill attempts against `pid` fail with a permission error
    pub fn deny_kill(&self, pid: u32) {
        if let Some(process) = self
            .processes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&pid)
        {
            process.deny_kill = true;
        }
    }

    /// Get a process by pid
    pub fn get_process(&self, pid: u32) -> Option<FakeProcess> {
        self.processes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&pid)
            .cloned()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProcessCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Pids that received a kill
    pub fn killed(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ProcessCall::Kill { pid } => Some(pid),
                ProcessCall::IsAlive { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ProcessAdapter for FakeProcessAdapter {
    async fn is_alive(&self, pid: u32) -> Result<bool, ProcessError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ProcessCall::IsAlive { pid });

        let processes = self.processes.lock().unwrap_or_else(|e| e.into_inner());
        Ok(processes.get(&pid).is_some_and(|p| p.alive))
    }

    async fn kill(&self, pid: u32) -> Result<(), ProcessError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ProcessCall::Kill { pid });

        let mut processes = self.processes.lock().unwrap_or_else(|e| e.into_inner());
        match processes.get_mut(&pid) {
            Some(process) if process.alive && process.deny_kill => {
                Err(ProcessError::PermissionDenied(pid))
            }
            Some(process) if process.alive => {
                process.alive = false;
                Ok(())
            }
            _ => Err(ProcessError::NotFound(pid)),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
