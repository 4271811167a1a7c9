//! Milestone reporting specs

use crate::prelude::*;

#[test]
fn fresh_daemon_lists_every_milestone_not_started() {
    let mut temp = Project::empty();
    temp.start_daemon();

    temp.wp()
        .args(&["status"])
        .passes()
        .stdout_has("MILESTONE")
        .stdout_has("InitialSetup")
        .stdout_has("Sync")
        .stdout_has("NotStarted");
}

#[test]
fn report_updates_status() {
    let mut temp = Project::empty();
    temp.start_daemon();

    temp.wp()
        .args(&["report", "Sync", "Running", "--pid", "4242"])
        .passes()
        .stdout_has("Sync is now Running");

    temp.wp()
        .args(&["show", "Sync"])
        .passes()
        .stdout_has("Condition: Running")
        .stdout_has("Process: 4242");
}

#[test]
fn status_json_is_machine_readable() {
    let mut temp = Project::empty();
    temp.start_daemon();
    temp.wp()
        .args(&["report", "InitialSetup", "Running", "--pid", "77"])
        .passes();

    let out = temp.wp().args(&["status", "--output", "json"]).passes();
    let rows: serde_json::Value = serde_json::from_str(&out.stdout_text()).unwrap();

    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["milestone"], "InitialSetup");
    assert_eq!(rows[0]["condition"], "Running");
    assert_eq!(rows[0]["process_id"], 77);
    assert_eq!(rows[1]["condition"], "NotStarted");
}

#[test]
fn block_all_blocks_and_sticks() {
    let mut temp = Project::empty();
    temp.start_daemon();

    temp.wp()
        .args(&["block-all"])
        .passes()
        .stdout_has("All milestones blocked");

    temp.wp()
        .args(&["report", "Sync", "Running", "--pid", "5"])
        .passes()
        .stderr_has("stayed Blocked");

    temp.wp()
        .args(&["status"])
        .passes()
        .stdout_lacks("Running ")
        .stdout_has("Blocked");

    temp.wp()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Blocked milestones: 2");
}

#[test]
fn config_shows_distributed_settings() {
    let mut temp = Project::empty();
    temp.file(
        "config.toml",
        "[action_cut_outs]\ndisable_github_operations = true\n\n[milestone_lifetime]\nmax_update_dwell_time = \"1m\"\n",
    );
    temp.start_daemon();

    temp.wp()
        .args(&["config"])
        .passes()
        .stdout_has("disable_github_operations = true")
        .stdout_has("max_update_dwell_time = \"1m\"");
}
