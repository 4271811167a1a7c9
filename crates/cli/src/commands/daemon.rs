// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon management commands

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use wp_client::{ClientError, Connection};

use super::connect;
use crate::output::{self, format_elapsed, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Check the daemon answers
    Ping,
    /// Show uptime and milestone counts
    Status,
    /// Ask the daemon to shut down
    Stop,
}

#[derive(Serialize)]
struct DaemonStatus {
    protocol_version: String,
    uptime_secs: u64,
    running: usize,
    blocked: usize,
}

impl fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: running")?;
        writeln!(f, "  Protocol: {}", self.protocol_version)?;
        writeln!(f, "  Uptime: {}", format_elapsed(self.uptime_secs))?;
        writeln!(f, "  Running milestones: {}", self.running)?;
        write!(f, "  Blocked milestones: {}", self.blocked)
    }
}

fn timeout_exit() -> Duration {
    std::env::var("WP_TIMEOUT_EXIT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(2))
}

pub async fn handle(args: DaemonArgs, socket_path: &Path, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Ping => {
            let mut conn = connect(socket_path).await?;
            let start = Instant::now();
            conn.ping().await?;
            println!("pong ({}ms)", start.elapsed().as_millis());
        }
        DaemonCommand::Status => {
            let mut conn = connect(socket_path).await?;
            let protocol_version = conn.hello().await?;
            let (uptime_secs, running, blocked) = conn.status().await?;
            output::print(
                &DaemonStatus {
                    protocol_version,
                    uptime_secs,
                    running,
                    blocked,
                },
                format,
            );
        }
        DaemonCommand::Stop => stop(socket_path).await?,
    }
    Ok(())
}

async fn stop(socket_path: &Path) -> Result<()> {
    let mut conn = match Connection::connect(socket_path).await {
        Ok(conn) => conn,
        Err(ClientError::DaemonNotRunning) => {
            println!("Daemon not running");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    conn.shutdown().await?;
    drop(conn);

    // The daemon removes its socket while shutting down
    let deadline = Instant::now() + timeout_exit();
    while socket_path.exists() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    if socket_path.exists() {
        eprintln!("warning: daemon acknowledged shutdown but its socket is still present");
    } else {
        println!("Daemon stopped");
    }
    Ok(())
}
