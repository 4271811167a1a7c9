//! Help and completion specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();

    temp.wp()
        .args(&["--help"])
        .passes()
        .stdout_has("status")
        .stdout_has("report")
        .stdout_has("block-all")
        .stdout_has("daemon");
}

#[test]
fn completions_generate_for_bash() {
    let temp = Project::empty();

    temp.wp()
        .args(&["completions", "bash"])
        .passes()
        .stdout_has("_wp()");
}

#[test]
fn completions_work_without_daemon() {
    let temp = Project::empty();

    temp.wp().args(&["completions", "zsh"]).passes().stdout_has("#compdef wp");
}
