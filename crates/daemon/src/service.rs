// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intelligence service: the RPC facade over the registry and audit log.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wp_core::{
    ActionEnvironment, ActivateOutcome, AuditLog, Clock, Config, ConfigError,
    IntelligenceSnapshot, Milestone, MilestoneCondition, RegistryHandle, UpdateOutcome,
};

use crate::protocol::{Request, Response, PROTOCOL_VERSION};

/// Shared state behind every connection
pub struct IntelligenceService<C: Clock> {
    registry: RegistryHandle,
    audit: AuditLog,
    config_json: String,
    environment: ActionEnvironment,
    clock: C,
    start_time: Instant,
    shutdown: CancellationToken,
}

impl<C: Clock> IntelligenceService<C> {
    /// Build the facade. Cut-outs in `config` are applied to `environment` here.
    pub fn new(
        registry: RegistryHandle,
        audit: AuditLog,
        config: &Config,
        environment: ActionEnvironment,
        clock: C,
        shutdown: CancellationToken,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            registry,
            audit,
            config_json: config.to_json()?,
            environment: environment.gated(&config.action_cut_outs),
            clock,
            start_time: Instant::now(),
            shutdown,
        })
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Handle one request. Never blocks on I/O.
    pub fn handle(&self, request: Request) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::Hello { version } => {
                debug!(client_version = %version, "hello");
                Response::Hello {
                    version: PROTOCOL_VERSION.to_string(),
                }
            }

            Request::Status => {
                let (running, blocked) = self.registry.with(|r| {
                    (
                        r.count(MilestoneCondition::Running),
                        r.count(MilestoneCondition::Blocked),
                    )
                });
                Response::Status {
                    uptime_secs: self.start_time.elapsed().as_secs(),
                    running,
                    blocked,
                }
            }

            Request::Shutdown => {
                info!("shutdown requested");
                self.shutdown.cancel();
                Response::ShuttingDown
            }

            Request::GetIntelligence => Response::Intelligence {
                snapshot: Box::new(self.intelligence()),
            },

            Request::Activate { milestone, pid } => self.activate(&milestone, pid),

            Request::UpdateMilestone {
                milestone,
                condition,
                pid,
            } => {
                self.update(&milestone, condition, pid);
                Response::Ok
            }

            Request::AppendLog { entry } => {
                self.audit.append(entry);
                Response::Ok
            }

            Request::BlockAll => {
                self.registry.with(|r| r.block_all());
                info!("all milestones blocked");
                Response::Ok
            }

            Request::GetLogs => Response::Logs {
                entries: self.audit.entries(),
            },

            Request::ClearLogs => {
                self.audit.clear();
                Response::Ok
            }
        }
    }

    /// Point-in-time copy of the registry with the distributable configuration
    pub fn intelligence(&self) -> IntelligenceSnapshot {
        IntelligenceSnapshot {
            milestones: self.registry.snapshot(),
            config_json: self.config_json.clone(),
            environment: self.environment.clone(),
        }
    }

    fn activate(&self, name: &str, pid: u32) -> Response {
        let milestone = match name.parse::<Milestone>() {
            Ok(m) => m,
            Err(e) => {
                return Response::Error {
                    message: e.to_string(),
                }
            }
        };

        let now = self.clock.now();
        let outcome = self.registry.with(|r| r.activate(milestone, pid, now));
        match outcome {
            ActivateOutcome::Activated => info!(%milestone, pid, "milestone activated"),
            ActivateOutcome::TookOver { previous_pid } => warn!(
                %milestone,
                pid,
                previous_pid,
                "milestone claimed while another process was still running it"
            ),
            ActivateOutcome::Blocked => info!(%milestone, pid, "activation ignored, milestone is blocked"),
        }
        Response::Activated { outcome }
    }

    fn update(&self, name: &str, condition: MilestoneCondition, pid: u32) {
        let now = self.clock.now();
        match self
            .registry
            .with(|r| r.update_status(name, condition, pid, now))
        {
            UpdateOutcome::Applied => debug!(milestone = name, %condition, pid, "status updated"),
            UpdateOutcome::UnknownMilestone => {
                debug!(milestone = name, "ignoring update for unknown milestone")
            }
            UpdateOutcome::Rejected { from, to } => {
                debug!(milestone = name, %from, %to, pid, "ignoring disallowed transition")
            }
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
