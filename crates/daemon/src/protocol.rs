// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol between stage processes and the daemon
//!
//! Every message is a 4-byte big-endian length prefix followed by a JSON
//! document. A connection carries any number of request/response pairs.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use wp_core::{ActivateOutcome, IntelligenceSnapshot, MilestoneCondition};

/// Protocol version reported in the Hello handshake
pub const PROTOCOL_VERSION: &str = "1";

/// Default timeout for a single read or write
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest message either side will accept
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Request from a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Liveness check
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Daemon uptime and milestone counts
    Status,

    /// Stop the daemon
    Shutdown,

    /// Registry snapshot plus configuration
    GetIntelligence,

    /// Claim a milestone for the calling process
    Activate { milestone: String, pid: u32 },

    /// Report a milestone's condition; doubles as a heartbeat
    UpdateMilestone {
        milestone: String,
        condition: MilestoneCondition,
        pid: u32,
    },

    /// Append a preformatted entry to the audit log
    AppendLog { entry: String },

    /// Block every milestone
    BlockAll,

    /// Read the audit log
    GetLogs,

    /// Empty the audit log
    ClearLogs,
}

/// Response from the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Ok,

    Pong,

    Hello {
        version: String,
    },

    Status {
        uptime_secs: u64,
        running: usize,
        blocked: usize,
    },

    ShuttingDown,

    Intelligence {
        snapshot: Box<IntelligenceSnapshot>,
    },

    Activated {
        outcome: ActivateOutcome,
    },

    Logs {
        entries: Vec<String>,
    },

    Error {
        message: String,
    },
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout")]
    Timeout,
}

/// Encode a message as JSON (no length prefix)
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

/// Decode a JSON message
pub fn decode<'a, T: Deserialize<'a>>(data: &'a [u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(data)?)
}

/// Read one length-prefixed message
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed);
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut data = vec![0u8; len];
    reader.read_exact(&mut data).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::ConnectionClosed
        } else {
            ProtocolError::Io(e)
        }
    })?;
    Ok(data)
}

/// Write one length-prefixed message
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    let len = data.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read the next request on an idle connection, waiting indefinitely
pub async fn next_request<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Request, ProtocolError> {
    let data = read_message(reader).await?;
    decode(&data)
}

/// Write a response within `timeout`
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let data = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
