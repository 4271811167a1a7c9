// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use std::sync::Arc;

use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use wp_core::Clock;

use crate::protocol::{self, ProtocolError, DEFAULT_TIMEOUT};
use crate::service::IntelligenceService;

/// Accept connections until `shutdown` is cancelled.
///
/// Each connection runs on its own task.
pub async fn serve<C: Clock>(
    listener: &UnixListener,
    service: Arc<IntelligenceService<C>>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let service = Arc::clone(&service);
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(&service, stream, shutdown).await {
                                error!("Error handling connection: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                }
            }
        }
    }
}

/// Serve requests on one connection until the client hangs up
pub async fn handle_connection<C: Clock>(
    service: &IntelligenceService<C>,
    stream: UnixStream,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let (mut reader, mut writer) = stream.into_split();

    loop {
        let request = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            result = protocol::next_request(&mut reader) => match result {
                Ok(request) => request,
                Err(ProtocolError::ConnectionClosed) => {
                    debug!("Client disconnected");
                    return Ok(());
                }
                Err(e) => {
                    error!("Failed to read request: {}", e);
                    return Err(ServerError::Protocol(e));
                }
            },
        };

        debug!("Received request: {:?}", request);

        let response = service.handle(request);

        debug!("Sending response: {:?}", response);

        protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
