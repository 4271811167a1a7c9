//! Shared fixtures for specs
//!
//! Each `Project` gets its own state directory and socket, so specs can run
//! in parallel without sharing a daemon.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use assert_cmd::assert::Assert;
use predicates::prelude::*;
use tempfile::TempDir;

/// Upper bound for waiting on the daemon
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// Poll `check` until it returns true or `max_ms` passes
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    check()
}

pub struct Project {
    dir: TempDir,
    daemon: Option<Child>,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            daemon: None,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// XDG_STATE_HOME for both binaries
    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.dir.path().join("wpd.sock")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// Write a file relative to the project root
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn isolate(&self, cmd: &mut Command) {
        cmd.current_dir(self.path())
            .env("XDG_STATE_HOME", self.state_path())
            .env("WP_SOCKET_PATH", self.socket_path())
            .env_remove("WP_CONFIG")
            .env_remove("RUST_LOG");
    }

    /// The wp CLI, isolated to this project
    pub fn wp(&self) -> CliBuilder {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("wp"));
        self.isolate(&mut cmd);
        CliBuilder { cmd }
    }

    /// The daemon binary run in the foreground
    pub fn wpd(&self) -> CliBuilder {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("wpd"));
        self.isolate(&mut cmd);
        cmd.arg(self.config_path());
        CliBuilder { cmd }
    }

    /// Start the daemon and wait until its socket accepts connections
    pub fn start_daemon(&mut self) {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("wpd"));
        self.isolate(&mut cmd);
        let child = cmd
            .arg(self.config_path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        self.daemon = Some(child);

        let socket = self.socket_path();
        let ready = wait_for(SPEC_WAIT_MAX_MS, || {
            std::os::unix::net::UnixStream::connect(&socket).is_ok()
        });
        assert!(ready, "daemon did not start; log:\n{}", self.daemon_log());
    }

    /// Wait for a started daemon to exit on its own
    pub fn wait_for_daemon_exit(&mut self) -> bool {
        let Some(child) = self.daemon.as_mut() else {
            return true;
        };
        wait_for(SPEC_WAIT_MAX_MS, || matches!(child.try_wait(), Ok(Some(_))))
    }

    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("waypoint/daemon.log")).unwrap_or_default()
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        if let Some(mut child) = self.daemon.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    fn run(mut self) -> Assert {
        let output = self.cmd.output().unwrap();
        Assert::new(output)
    }

    /// Run and expect exit code 0
    pub fn passes(self) -> Assert {
        self.run().success()
    }

    /// Run and expect a non-zero exit
    pub fn fails(self) -> Assert {
        self.run().failure()
    }
}

/// Readable content checks on a finished command
pub trait AssertExt {
    fn stdout_has(self, needle: &str) -> Self;
    fn stdout_lacks(self, needle: &str) -> Self;
    fn stderr_has(self, needle: &str) -> Self;
    fn stderr_lacks(self, needle: &str) -> Self;
    fn stdout_text(&self) -> String;
}

impl AssertExt for Assert {
    fn stdout_has(self, needle: &str) -> Self {
        self.stdout(predicate::str::contains(needle))
    }

    fn stdout_lacks(self, needle: &str) -> Self {
        self.stdout(predicate::str::contains(needle).not())
    }

    fn stderr_has(self, needle: &str) -> Self {
        self.stderr(predicate::str::contains(needle))
    }

    fn stderr_lacks(self, needle: &str) -> Self {
        self.stderr(predicate::str::contains(needle).not())
    }

    fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.get_output().stdout).to_string()
    }
}
