// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client used by a milestone process to report on itself

use std::path::Path;

use tracing::{debug, warn};
use wp_core::audit::{stamp, AuditLevel};
use wp_core::{
    retry_with_backoff, ActivateOutcome, Config, IntelligenceSnapshot, Milestone,
    MilestoneCondition, RetryPolicy,
};

use crate::connection::{ClientError, Connection};

/// Connection to the daemon bound to one milestone.
///
/// The socket closes when the client is dropped, however the owning scope
/// exits.
pub struct StageClient {
    milestone: Milestone,
    connection: Connection,
}

impl StageClient {
    /// Connect using `WP_SOCKET_PATH` or the default socket
    pub async fn connect(milestone: Milestone) -> Result<Self, ClientError> {
        Self::connect_to(&crate::socket_path(), milestone).await
    }

    pub async fn connect_to(socket_path: &Path, milestone: Milestone) -> Result<Self, ClientError> {
        let connection = Connection::connect(socket_path).await?;
        debug!(%milestone, socket = %socket_path.display(), "stage client connected");
        Ok(Self {
            milestone,
            connection,
        })
    }

    /// Connect, waiting out a daemon that is still starting
    pub async fn connect_with_retry(
        socket_path: &Path,
        milestone: Milestone,
        policy: RetryPolicy,
    ) -> Result<Self, ClientError> {
        retry_with_backoff(
            policy,
            || Self::connect_to(socket_path, milestone),
            |attempt, e| warn!(%milestone, attempt, error = %e, "daemon connection failed"),
        )
        .await
        .map_err(|e| e.into_last())
    }

    pub fn milestone(&self) -> Milestone {
        self.milestone
    }

    /// Claim the milestone for this process
    pub async fn activate(&mut self) -> Result<ActivateOutcome, ClientError> {
        let outcome = self
            .connection
            .activate(self.milestone.name(), std::process::id())
            .await?;
        if let ActivateOutcome::TookOver { previous_pid } = outcome {
            warn!(milestone = %self.milestone, previous_pid, "took over a milestone another process was running");
        }
        Ok(outcome)
    }

    /// Report a new condition. Also refreshes the heartbeat.
    pub async fn set_status(&mut self, condition: MilestoneCondition) -> Result<(), ClientError> {
        self.connection
            .update_milestone(self.milestone.name(), condition, std::process::id())
            .await
    }

    pub async fn get_status(&mut self) -> Result<MilestoneCondition, ClientError> {
        let snapshot = self.connection.get_intelligence().await?;
        Ok(snapshot.status(self.milestone).condition)
    }

    /// Timestamp `text`, tag it with this milestone, and append it to the
    /// audit log
    pub async fn log_message(&mut self, text: &str) -> Result<(), ClientError> {
        let message = format!("[{}] {}", self.milestone, text);
        self.connection
            .append_log(stamp(AuditLevel::Message, &message))
            .await
    }

    pub async fn block_all_milestones(&mut self) -> Result<(), ClientError> {
        self.connection.block_all().await
    }

    /// Decode the configuration distributed in the snapshot
    pub async fn get_configuration(&mut self) -> Result<Config, ClientError> {
        let snapshot = self.connection.get_intelligence().await?;
        Ok(snapshot.config()?)
    }

    pub async fn get_intelligence(&mut self) -> Result<IntelligenceSnapshot, ClientError> {
        self.connection.get_intelligence().await
    }

    /// Close the connection explicitly
    pub async fn close(self) -> Result<(), ClientError> {
        self.connection.close().await
    }
}
