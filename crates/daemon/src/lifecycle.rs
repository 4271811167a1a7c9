// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wp_adapters::{SignalProcessAdapter, TracedProcessAdapter};
use wp_core::{ActionEnvironment, AuditLog, Config, ConfigError, RegistryHandle, SystemClock};

use crate::monitor::LifetimeMonitor;
use crate::service::IntelligenceService;

/// Overrides the socket location
pub const SOCKET_PATH_ENV: &str = "WP_SOCKET_PATH";

/// Overrides the configuration file location
pub const CONFIG_PATH_ENV: &str = "WP_CONFIG";

/// Socket used when `WP_SOCKET_PATH` is unset.
///
/// Lives under /tmp to keep the path short (macOS SUN_LEN = 104).
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/waypoint/wpd.sock";

/// Socket path from the environment, or the default
pub fn socket_path() -> PathBuf {
    match std::env::var(SOCKET_PATH_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_SOCKET_PATH),
    }
}

/// Get the state directory for waypoint
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    // Use XDG_STATE_HOME or default to ~/.local/state
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("waypoint"));
    }

    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/waypoint"))
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the TOML configuration
    pub config_path: PathBuf,
}

impl DaemonConfig {
    /// Resolve paths from the environment. An explicit config path wins over
    /// `WP_CONFIG`.
    pub fn from_env(config_path: Option<PathBuf>) -> Result<Self, LifecycleError> {
        let state_dir = state_dir()?;
        let config_path = config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| state_dir.join("config.toml"));

        let mut config = Self::in_dir(&state_dir, socket_path());
        config.config_path = config_path;
        Ok(config)
    }

    /// Lay out every daemon file under `state_dir`
    pub fn in_dir(state_dir: &Path, socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            config_path: state_dir.join("config.toml"),
        }
    }
}

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: DaemonConfig,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    /// RPC facade shared with connection tasks
    pub service: Arc<IntelligenceService<SystemClock>>,
    /// Cancelled on shutdown; stops the server and the monitor
    pub shutdown: CancellationToken,
    monitor: Option<JoinHandle<()>>,
}

impl DaemonState {
    /// Shutdown the daemon gracefully
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        // 1. Stop the monitor and any open connections
        self.shutdown.cancel();
        if let Some(monitor) = self.monitor.take() {
            if let Err(e) = monitor.await {
                warn!("Lifetime monitor ended abnormally: {}", e);
            }
        }

        // 2. Remove socket, PID and version files
        for path in [
            &self.config.socket_path,
            &self.config.lock_path,
            &self.config.version_path,
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!("Failed to remove {}: {}", path.display(), e);
                }
            }
        }

        // 3. Lock file is released automatically when self.lock_file is dropped

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &DaemonConfig) -> Result<DaemonState, LifecycleError> {
    // Lock first; losing the race must not touch the running daemon's files
    let lock_file = acquire_lock(config)?;

    match startup_inner(config, lock_file).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

fn acquire_lock(config: &DaemonConfig) -> Result<File, LifecycleError> {
    if let Some(parent) = config.lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    Ok(lock_file)
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(
    config: &DaemonConfig,
    lock_file: File,
) -> Result<DaemonState, LifecycleError> {
    // 1. Write PID to lock file
    use std::io::Write;
    lock_file.set_len(0)?;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 2. Write version file
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // 3. Load config BEFORE binding socket (fail fast, don't accept connections if invalid)
    let settings = Config::load(&config.config_path)?;
    let environment = ActionEnvironment::from_env();
    info!(
        "Loaded config from {} (environment: {:?})",
        config.config_path.display(),
        environment
    );

    // 4. Shared state
    let registry = RegistryHandle::default();
    let audit = AuditLog::new();
    let shutdown = CancellationToken::new();
    let service = Arc::new(IntelligenceService::new(
        registry.clone(),
        audit.clone(),
        &settings,
        environment,
        SystemClock,
        shutdown.clone(),
    )?);

    // 5. Remove stale socket and bind (LAST - only after all validation passes)
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    // 6. Start the lifetime monitor
    let monitor = LifetimeMonitor::new(
        registry,
        audit,
        TracedProcessAdapter::new(SignalProcessAdapter::new()),
        SystemClock,
        settings.milestone_lifetime,
    );
    let monitor = tokio::spawn(monitor.run(shutdown.clone()));

    info!("Daemon started, socket at {}", config.socket_path.display());

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        service,
        shutdown,
        monitor: Some(monitor),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &DaemonConfig) {
    // Remove socket if we created it
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }

    // Remove version file
    if config.version_path.exists() {
        let _ = std::fs::remove_file(&config.version_path);
    }

    // Remove PID/lock file
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
