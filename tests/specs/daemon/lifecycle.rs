//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status lifecycle.

use crate::prelude::*;

#[test]
fn daemon_status_fails_when_not_running() {
    let temp = Project::empty();

    temp.wp()
        .args(&["daemon", "status"])
        .fails()
        .stderr_has("Daemon not running");
}

#[test]
fn daemon_stop_when_not_running_is_harmless() {
    let temp = Project::empty();

    temp.wp()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_status_shows_running() {
    let mut temp = Project::empty();
    temp.start_daemon();

    temp.wp()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has("Uptime:")
        .stdout_has("Running milestones: 0");
}

#[test]
fn daemon_ping_answers() {
    let mut temp = Project::empty();
    temp.start_daemon();

    temp.wp().args(&["daemon", "ping"]).passes().stdout_has("pong");
}

#[test]
fn daemon_creates_pid_and_version_files() {
    let mut temp = Project::empty();
    temp.start_daemon();

    let dir = temp.state_path().join("waypoint");
    assert!(dir.join("daemon.pid").exists(), "daemon.pid should exist");
    assert!(dir.join("daemon.version").exists(), "daemon.version should exist");
}

#[test]
fn daemon_stop_removes_socket_and_exits() {
    let mut temp = Project::empty();
    temp.start_daemon();

    temp.wp()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");

    assert!(temp.wait_for_daemon_exit(), "daemon should exit after stop");
    assert!(!temp.socket_path().exists());
    assert!(!temp.state_path().join("waypoint/daemon.pid").exists());

    temp.wp()
        .args(&["daemon", "status"])
        .fails()
        .stderr_has("Daemon not running");
}

#[test]
fn daemon_log_has_startup_marker() {
    let mut temp = Project::empty();
    temp.start_daemon();

    let has_marker = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.daemon_log().contains("--- wpd: starting (pid: ")
    });
    assert!(has_marker, "log:\n{}", temp.daemon_log());
}

#[test]
fn invalid_config_stops_startup() {
    let temp = Project::empty();
    temp.file(
        "config.toml",
        "[milestone_lifetime]\npoll_interval = \"10m\"\nmax_update_dwell_time = \"1m\"\n",
    );

    temp.wpd().fails().stderr_has("poll_interval");

    assert!(!temp.socket_path().exists());
    assert!(temp
        .daemon_log()
        .contains("ERROR Failed to start daemon"));
}
