// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod daemon;
pub mod log;
pub mod milestone;

use std::path::Path;

use anyhow::Result;
use wp_client::{ClientError, Connection};
use wp_core::Milestone;

use crate::error::WpError;

/// Connect to the daemon, explaining how to start it if it is not running
pub async fn connect(socket_path: &Path) -> Result<Connection> {
    match Connection::connect(socket_path).await {
        Ok(conn) => Ok(conn),
        Err(ClientError::DaemonNotRunning) => Err(WpError::daemon_not_running(socket_path).into()),
        Err(e) => Err(e.into()),
    }
}

pub fn parse_milestone(name: &str) -> Result<Milestone> {
    name.parse::<Milestone>()
        .map_err(|_| WpError::unknown_milestone(name).into())
}
