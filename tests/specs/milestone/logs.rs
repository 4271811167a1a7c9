//! Audit log specs

use crate::prelude::*;

#[test]
fn empty_log_says_so() {
    let mut temp = Project::empty();
    temp.start_daemon();

    temp.wp().args(&["logs"]).passes().stdout_has("No log entries");
}

#[test]
fn log_entries_are_stamped_in_order() {
    let mut temp = Project::empty();
    temp.start_daemon();

    temp.wp().args(&["log", "first step"]).passes();
    temp.wp().args(&["log", "second step"]).passes();

    let out = temp.wp().args(&["logs"]).passes();
    let text = out.stdout_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2, "stdout:\n{}", text);
    assert!(lines[0].ends_with("[Message] first step"));
    assert!(lines[1].ends_with("[Message] second step"));
}

#[test]
fn clear_empties_log() {
    let mut temp = Project::empty();
    temp.start_daemon();
    temp.wp().args(&["log", "noise"]).passes();

    temp.wp()
        .args(&["logs", "--clear"])
        .passes()
        .stdout_has("Audit log cleared");

    temp.wp().args(&["logs"]).passes().stdout_has("No log entries");
}
