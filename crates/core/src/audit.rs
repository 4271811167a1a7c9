// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared audit log
//!
//! An append-only ordered list of timestamped lines. It has its own lock so
//! log appends never contend with registry updates.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity tag written into an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Message,
    Warning,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditLevel::Message => f.write_str("Message"),
            AuditLevel::Warning => f.write_str("Warning"),
        }
    }
}

/// Format an audit line: `[2026-01-02T03:04:05Z] [Message] text`
pub fn format_entry(level: AuditLevel, message: &str, at: DateTime<Utc>) -> String {
    format!("[{}] [{}] {}", at.format("%Y-%m-%dT%H:%M:%SZ"), level, message)
}

/// Format an audit line stamped with the current time
pub fn stamp(level: AuditLevel, message: &str) -> String {
    format_entry(level, message, Utc::now())
}

/// Append-only audit log shared between the facade and the monitor
#[derive(Clone, Default)]
pub struct AuditLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a preformatted entry
    pub fn append(&self, entry: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.into());
    }

    /// Append a warning stamped with the current time
    pub fn warn(&self, message: &str) {
        self.append(stamp(AuditLevel::Warning, message));
    }

    /// Copy of all entries in append order
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
