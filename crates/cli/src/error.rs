// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.

use std::fmt;
use std::path::Path;

use wp_core::Milestone;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct WpError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl WpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Nothing is listening on the socket
    pub fn daemon_not_running(socket_path: &Path) -> Self {
        WpError::new("Daemon not running")
            .with_context(format!("No daemon is listening on {}", socket_path.display()))
            .with_suggestion("Start it in another terminal: wpd")
            .with_suggestion("Point at a different socket with WP_SOCKET_PATH or --socket")
    }

    /// The name is not one of the fixed milestones
    pub fn unknown_milestone(name: &str) -> Self {
        let known: Vec<&str> = Milestone::ALL.iter().map(|m| m.name()).collect();
        WpError::new(format!("Unknown milestone '{}'", name))
            .with_context(format!("Known milestones: {}", known.join(", ")))
            .with_suggestion("List milestones with: wp status")
    }
}

impl fmt::Display for WpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for WpError {}
