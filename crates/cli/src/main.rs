// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wp - Waypoint CLI

mod commands;
mod completions;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{daemon, log, milestone};

use crate::completions::CompletionsArgs;
use crate::error::WpError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "wp",
    version,
    about = "Waypoint - milestone coordination for pipeline stages"
)]
struct Cli {
    /// Daemon socket (defaults to WP_SOCKET_PATH or /tmp/waypoint/wpd.sock)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, value_enum, default_value_t)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every milestone
    Status,
    /// Show one milestone
    Show {
        /// Milestone name
        milestone: String,
    },
    /// Report a milestone's condition
    Report {
        /// Milestone name
        milestone: String,
        /// NotStarted, Running, Completed, Failed or Blocked
        condition: String,
        /// Owning process (defaults to the calling shell)
        #[arg(long)]
        pid: Option<u32>,
    },
    /// Block every milestone
    BlockAll,
    /// Print the audit log
    Logs {
        /// Empty the log instead
        #[arg(long)]
        clear: bool,
    },
    /// Append a message to the audit log
    Log {
        /// Message text
        text: String,
    },
    /// Print the configuration the daemon distributes
    Config,
    /// Daemon management
    Daemon(daemon::DaemonArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<WpError>() {
                Some(wp) => eprint!("{}", wp),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let socket_path = cli.socket.unwrap_or_else(wp_client::socket_path);
    let format = cli.output;

    // Commands that manage their own connection
    let command = match cli.command {
        Commands::Completions(args) => {
            completions::generate_completions::<Cli>(args.shell);
            return Ok(());
        }
        Commands::Daemon(args) => return daemon::handle(args, &socket_path, format).await,
        command => command,
    };

    let mut conn = commands::connect(&socket_path).await?;

    match command {
        Commands::Status => milestone::status(&mut conn, format).await?,
        Commands::Show { milestone } => milestone::show(&mut conn, &milestone, format).await?,
        Commands::Report {
            milestone,
            condition,
            pid,
        } => milestone::report(&mut conn, &milestone, &condition, pid).await?,
        Commands::BlockAll => milestone::block_all(&mut conn).await?,
        Commands::Logs { clear } => log::logs(&mut conn, clear, format).await?,
        Commands::Log { text } => log::log(&mut conn, &text).await?,
        Commands::Config => milestone::config(&mut conn, format).await?,
        Commands::Daemon(_) | Commands::Completions(_) => unreachable!(),
    }

    conn.close().await?;
    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn`
fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
