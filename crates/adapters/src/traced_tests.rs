// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::process::FakeProcessAdapter;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

#[tokio::test]
async fn traced_adapter_passes_results_through() {
    let fake = FakeProcessAdapter::new();
    fake.spawn(42);
    let traced = TracedProcessAdapter::new(fake.clone());

    assert!(traced.is_alive(42).await.unwrap());
    traced.kill(42).await.unwrap();
    assert!(!traced.is_alive(42).await.unwrap());
    assert_eq!(fake.killed(), vec![42]);
}

#[test]
fn traced_kill_logs_span_and_outcome() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeProcessAdapter::new();
        fake.spawn(500);
        TracedProcessAdapter::new(fake).kill(500).await
    });

    assert!(result.is_ok());
    assert!(logs.contains("process.kill"), "Logs:\n{}", logs);
    assert!(logs.contains("pid=500"), "Logs:\n{}", logs);
    assert!(logs.contains("killed"), "Logs:\n{}", logs);
}

#[test]
fn traced_kill_warns_on_permission_failure() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeProcessAdapter::new();
        fake.spawn(9);
        fake.deny_kill(9);
        TracedProcessAdapter::new(fake).kill(9).await
    });

    assert!(matches!(result, Err(ProcessError::PermissionDenied(9))));
    assert!(logs.contains("WARN"), "Logs:\n{}", logs);
    assert!(logs.contains("kill failed"), "Logs:\n{}", logs);
}

#[test]
fn traced_kill_of_missing_process_is_not_a_warning() {
    let (logs, result) = with_tracing(|| async {
        TracedProcessAdapter::new(FakeProcessAdapter::new())
            .kill(3)
            .await
    });

    assert!(matches!(result, Err(ProcessError::NotFound(3))));
    assert!(!logs.contains("WARN"), "Logs:\n{}", logs);
    assert!(logs.contains("already gone"), "Logs:\n{}", logs);
}
