// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wp-daemon: the Waypoint coordination daemon
//!
//! Owns the intelligence registry, serves it over a Unix socket and runs the
//! lifetime monitor. The `wpd` binary wires these together; the protocol
//! module is shared with clients.

pub mod lifecycle;
pub mod monitor;
pub mod protocol;
pub mod server;
pub mod service;

pub use lifecycle::{socket_path, DaemonConfig, LifecycleError};
pub use monitor::{LifetimeMonitor, Reaped, Termination};
pub use protocol::{ProtocolError, Request, Response};
pub use server::{serve, ServerError};
pub use service::IntelligenceService;
