// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response channel over the daemon socket

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use wp_core::{ActivateOutcome, ConfigError, IntelligenceSnapshot, MilestoneCondition};
use wp_daemon::protocol::{self, ProtocolError, Request, Response};

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for each IPC request
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("WP_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("Invalid configuration from daemon: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An open connection to the daemon. Dropping it closes the socket.
///
/// A request that fails partway (timeout, I/O error, hang-up) drops the
/// socket: a late reply must never be read as the answer to a later call.
pub struct Connection {
    stream: Option<UnixStream>,
    timeout: Duration,
}

impl Connection {
    /// Connect to the daemon at `socket_path`. Fails immediately if it is not
    /// listening.
    pub async fn connect(socket_path: &Path) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }

        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused => {
                    ClientError::DaemonNotRunning
                }
                _ => ClientError::Io(e),
            })?;

        Ok(Self {
            stream: Some(stream),
            timeout: timeout_ipc(),
        })
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the socket is still usable
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Send a request and wait for its response
    pub async fn send(&mut self, request: &Request) -> Result<Response, ClientError> {
        let data = protocol::encode(request)?;
        let mut stream = self.stream.take().ok_or(ProtocolError::ConnectionClosed)?;

        let response_bytes = round_trip(&mut stream, &data, self.timeout).await?;
        // Only a completed round trip leaves the stream in step
        self.stream = Some(stream);

        let response: Response = protocol::decode(&response_bytes)?;
        Ok(response)
    }

    /// Send a request that answers with `Ok`
    async fn send_ok(&mut self, request: &Request) -> Result<(), ClientError> {
        match self.send(request).await? {
            Response::Ok => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Liveness check
    pub async fn ping(&mut self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Get the daemon's protocol version via Hello handshake
    pub async fn hello(&mut self) -> Result<String, ClientError> {
        let request = Request::Hello {
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Get daemon status: (uptime_secs, running, blocked)
    pub async fn status(&mut self) -> Result<(u64, usize, usize), ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status {
                uptime_secs,
                running,
                blocked,
            } => Ok((uptime_secs, running, blocked)),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&mut self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn get_intelligence(&mut self) -> Result<IntelligenceSnapshot, ClientError> {
        match self.send(&Request::GetIntelligence).await? {
            Response::Intelligence { snapshot } => Ok(*snapshot),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn activate(
        &mut self,
        milestone: &str,
        pid: u32,
    ) -> Result<ActivateOutcome, ClientError> {
        let request = Request::Activate {
            milestone: milestone.to_string(),
            pid,
        };
        match self.send(&request).await? {
            Response::Activated { outcome } => Ok(outcome),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn update_milestone(
        &mut self,
        milestone: &str,
        condition: MilestoneCondition,
        pid: u32,
    ) -> Result<(), ClientError> {
        self.send_ok(&Request::UpdateMilestone {
            milestone: milestone.to_string(),
            condition,
            pid,
        })
        .await
    }

    pub async fn append_log(&mut self, entry: String) -> Result<(), ClientError> {
        self.send_ok(&Request::AppendLog { entry }).await
    }

    pub async fn block_all(&mut self) -> Result<(), ClientError> {
        self.send_ok(&Request::BlockAll).await
    }

    pub async fn get_logs(&mut self) -> Result<Vec<String>, ClientError> {
        match self.send(&Request::GetLogs).await? {
            Response::Logs { entries } => Ok(entries),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn clear_logs(&mut self) -> Result<(), ClientError> {
        self.send_ok(&Request::ClearLogs).await
    }

    /// Close the socket, flushing any buffered writes
    pub async fn close(mut self) -> Result<(), ClientError> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await?;
        }
        Ok(())
    }
}

async fn round_trip(
    stream: &mut UnixStream,
    data: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, ProtocolError> {
    tokio::time::timeout(timeout, protocol::write_message(stream, data))
        .await
        .map_err(|_| ProtocolError::Timeout)??;

    tokio::time::timeout(timeout, protocol::read_message(stream))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
