// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for connection setup and response mapping.

use super::*;
use tempfile::tempdir;
use tokio::net::UnixListener;

#[tokio::test]
async fn missing_socket_is_daemon_not_running() {
    let dir = tempdir().unwrap();
    let result = Connection::connect(&dir.path().join("wpd.sock")).await;
    assert!(matches!(result, Err(ClientError::DaemonNotRunning)));
}

#[tokio::test]
async fn stale_socket_file_is_daemon_not_running() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wpd.sock");

    // Bind then drop: the file stays but nobody is listening
    drop(std::os::unix::net::UnixListener::bind(&path).unwrap());
    assert!(path.exists());

    let result = Connection::connect(&path).await;
    assert!(matches!(result, Err(ClientError::DaemonNotRunning)));
}

/// Serve one canned response to whatever request arrives
async fn canned(response: Response) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wpd.sock");
    let listener = UnixListener::bind(&path).unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = protocol::read_message(&mut stream).await.unwrap();
        let data = protocol::encode(&response).unwrap();
        protocol::write_message(&mut stream, &data).await.unwrap();
    });
    (dir, path)
}

#[tokio::test]
async fn error_response_maps_to_rejected() {
    let (_dir, path) = canned(Response::Error {
        message: "unknown milestone: Teleport".to_string(),
    })
    .await;

    let mut conn = Connection::connect(&path).await.unwrap();
    let result = conn.activate("Teleport", 1).await;

    assert!(matches!(result, Err(ClientError::Rejected(m)) if m.contains("Teleport")));
}

#[tokio::test]
async fn wrong_response_is_unexpected() {
    let (_dir, path) = canned(Response::Pong).await;

    let mut conn = Connection::connect(&path).await.unwrap();
    let result = conn.get_logs().await;

    assert!(matches!(result, Err(ClientError::UnexpectedResponse)));
}

#[tokio::test]
async fn silent_daemon_times_out() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wpd.sock");
    let listener = UnixListener::bind(&path).unwrap();
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    let mut conn = Connection::connect(&path)
        .await
        .unwrap()
        .with_timeout(Duration::from_millis(50));
    let result = conn.ping().await;

    assert!(matches!(
        result,
        Err(ClientError::Protocol(ProtocolError::Timeout))
    ));
}

#[tokio::test]
async fn late_reply_is_never_read_by_the_next_call() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wpd.sock");
    let listener = UnixListener::bind(&path).unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        for (delay, entry) in [(300, "OLD"), (0, "NEW")] {
            if protocol::read_message(&mut stream).await.is_err() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(delay)).await;
            let data = protocol::encode(&Response::Logs {
                entries: vec![entry.to_string()],
            })
            .unwrap();
            let _ = protocol::write_message(&mut stream, &data).await;
        }
    });

    let mut conn = Connection::connect(&path)
        .await
        .unwrap()
        .with_timeout(Duration::from_millis(100));

    let first = conn.get_logs().await;
    assert!(matches!(
        first,
        Err(ClientError::Protocol(ProtocolError::Timeout))
    ));
    assert!(!conn.is_open());

    // Give the late reply time to land in the old socket's buffer
    tokio::time::sleep(Duration::from_millis(300)).await;

    let second = conn.get_logs().await;
    assert!(
        matches!(
            second,
            Err(ClientError::Protocol(ProtocolError::ConnectionClosed))
        ),
        "expected a closed connection, got {second:?}"
    );
}

#[tokio::test]
async fn completed_round_trips_keep_the_connection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wpd.sock");
    let listener = UnixListener::bind(&path).unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        while protocol::read_message(&mut stream).await.is_ok() {
            let data = protocol::encode(&Response::Pong).unwrap();
            protocol::write_message(&mut stream, &data).await.unwrap();
        }
    });

    let mut conn = Connection::connect(&path).await.unwrap();
    conn.ping().await.unwrap();
    conn.ping().await.unwrap();
    assert!(conn.is_open());
}
