// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Milestone commands: status, show, report, block-all, config

use std::fmt;

use anyhow::Result;
use serde::Serialize;
use wp_client::Connection;
use wp_core::{Clock, Milestone, MilestoneCondition, MilestoneStatus, SystemClock};

use super::parse_milestone;
use crate::output::{self, format_elapsed, OutputFormat};

#[derive(Debug, Serialize)]
pub struct MilestoneRow {
    milestone: Milestone,
    condition: MilestoneCondition,
    process_id: u32,
    start_time: u64,
    last_update: u64,
    #[serde(skip)]
    now: u64,
}

impl MilestoneRow {
    fn new(milestone: Milestone, status: MilestoneStatus, now: u64) -> Self {
        Self {
            milestone,
            condition: status.condition,
            process_id: status.process_id,
            start_time: status.start_time,
            last_update: status.last_update,
            now,
        }
    }

    fn pid(&self) -> String {
        match self.process_id {
            0 => "-".to_string(),
            pid => pid.to_string(),
        }
    }

    fn age(&self, since: u64) -> String {
        match since {
            0 => "-".to_string(),
            t => format_elapsed(self.now.saturating_sub(t)),
        }
    }
}

impl fmt::Display for MilestoneRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<14} {:<11} {:>8} {:>10} {:>10}",
            self.milestone.name(),
            self.condition.to_string(),
            self.pid(),
            self.age(self.start_time),
            self.age(self.last_update),
        )
    }
}

/// Detail view for `wp show`
#[derive(Serialize)]
#[serde(transparent)]
struct MilestoneDetail(MilestoneRow);

impl fmt::Display for MilestoneDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = &self.0;
        writeln!(f, "Milestone: {}", row.milestone)?;
        writeln!(f, "  Condition: {}", row.condition)?;
        writeln!(f, "  Process: {}", row.pid())?;
        writeln!(f, "  Running for: {}", row.age(row.start_time))?;
        write!(f, "  Last update: {} ago", row.age(row.last_update))
    }
}

pub async fn status(conn: &mut Connection, format: OutputFormat) -> Result<()> {
    let snapshot = conn.get_intelligence().await?;
    let now = SystemClock.now();
    let rows: Vec<MilestoneRow> = Milestone::ALL
        .into_iter()
        .map(|m| MilestoneRow::new(m, snapshot.status(m), now))
        .collect();

    if let OutputFormat::Text = format {
        println!(
            "{:<14} {:<11} {:>8} {:>10} {:>10}",
            "MILESTONE", "CONDITION", "PID", "RUNNING", "UPDATED"
        );
    }
    output::print_list(&rows, format);
    Ok(())
}

pub async fn show(conn: &mut Connection, name: &str, format: OutputFormat) -> Result<()> {
    let milestone = parse_milestone(name)?;
    let snapshot = conn.get_intelligence().await?;
    let row = MilestoneRow::new(milestone, snapshot.status(milestone), SystemClock.now());
    output::print(&MilestoneDetail(row), format);
    Ok(())
}

/// Report a condition on behalf of a stage. Defaults to the caller's parent
/// process, which is the script that invoked `wp`.
pub async fn report(
    conn: &mut Connection,
    name: &str,
    condition: &str,
    pid: Option<u32>,
) -> Result<()> {
    let milestone = parse_milestone(name)?;
    let condition: MilestoneCondition = condition.parse()?;
    let pid = pid.unwrap_or_else(std::os::unix::process::parent_id);

    conn.update_milestone(milestone.name(), condition, pid)
        .await?;

    // Updates are accepted silently; read back to tell the user if it stuck
    let current = conn.get_intelligence().await?.status(milestone).condition;
    if current == condition {
        println!("{} is now {}", milestone, condition);
    } else {
        eprintln!(
            "warning: {} stayed {} (transition to {} not allowed)",
            milestone, current, condition
        );
    }
    Ok(())
}

pub async fn block_all(conn: &mut Connection) -> Result<()> {
    conn.block_all().await?;
    println!("All milestones blocked");
    Ok(())
}

pub async fn config(conn: &mut Connection, format: OutputFormat) -> Result<()> {
    let config = conn.get_intelligence().await?.config()?;
    match format {
        OutputFormat::Text => print!("{}", toml::to_string_pretty(&config)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
