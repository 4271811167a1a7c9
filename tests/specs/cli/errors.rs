//! Error reporting specs

use crate::prelude::*;

#[test]
fn status_without_daemon_explains_how_to_start() {
    let temp = Project::empty();

    temp.wp()
        .args(&["status"])
        .fails()
        .stderr_has("error: Daemon not running")
        .stderr_has("suggestions:")
        .stderr_has("wpd");
}

#[test]
fn unknown_milestone_is_reported() {
    let mut temp = Project::empty();
    temp.start_daemon();

    temp.wp()
        .args(&["show", "Teleport"])
        .fails()
        .stderr_has("Unknown milestone 'Teleport'")
        .stderr_has("InitialSetup, Sync");
}

#[test]
fn unknown_condition_is_reported() {
    let mut temp = Project::empty();
    temp.start_daemon();

    temp.wp()
        .args(&["report", "Sync", "Sleeping"])
        .fails()
        .stderr_has("Sleeping");
}
