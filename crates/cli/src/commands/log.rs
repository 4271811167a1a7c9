// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit log commands

use anyhow::Result;
use wp_client::Connection;
use wp_core::audit::{stamp, AuditLevel};

use crate::output::{self, OutputFormat};

pub async fn logs(conn: &mut Connection, clear: bool, format: OutputFormat) -> Result<()> {
    if clear {
        conn.clear_logs().await?;
        println!("Audit log cleared");
        return Ok(());
    }

    let entries = conn.get_logs().await?;
    if entries.is_empty() {
        if let OutputFormat::Text = format {
            println!("No log entries");
            return Ok(());
        }
    }
    output::print_list(&entries, format);
    Ok(())
}

pub async fn log(conn: &mut Connection, text: &str) -> Result<()> {
    conn.append_log(stamp(AuditLevel::Message, text)).await?;
    Ok(())
}
