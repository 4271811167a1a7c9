// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wp-core: Core library for the Waypoint milestone coordinator
//!
//! This crate provides:
//! - The milestone state machine and the intelligence registry
//! - Distributable configuration and the snapshot exchanged with stages
//! - The shared audit log
//! - Retry with randomized backoff for external collaborators

pub mod audit;
pub mod clock;
pub mod config;
pub mod milestone;
pub mod registry;
pub mod retry;
pub mod snapshot;

// Re-exports
pub use audit::{AuditLevel, AuditLog};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ActionCutOuts, Config, ConfigError, MilestoneLifetimeConfig};
pub use milestone::{Milestone, MilestoneCondition, MilestoneStatus, ParseError};
pub use registry::{
    ActivateOutcome, Overdue, OverdueReason, Registry, RegistryError, RegistryHandle,
    UpdateOutcome,
};
pub use retry::{retry_with_backoff, RetryError, RetryPolicy};
pub use snapshot::{ActionEnvironment, IntelligenceSnapshot};
