// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wp-client: talk to the Waypoint daemon
//!
//! [`StageClient`] is linked into each milestone process. [`Connection`] is
//! the raw request/response channel, also used by the `wp` CLI.

mod connection;
mod stage;

pub use connection::{timeout_ipc, ClientError, Connection};
pub use stage::StageClient;
pub use wp_daemon::socket_path;
