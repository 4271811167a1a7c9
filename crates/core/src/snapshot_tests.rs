// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::milestone::MilestoneCondition;
use crate::registry::Registry;
use std::collections::HashMap;

fn full_env() -> ActionEnvironment {
    let vars: HashMap<&str, &str> = [
        (env::GITHUB_REPOSITORY, "owner/repo"),
        (env::GITHUB_TOKEN, "gh-token"),
        (env::API_TOKEN, "api-token"),
        (env::STORED_TOKEN_RESPONSE, "{\"access_token\":\"x\"}"),
        (env::CLIENT_ID, "client"),
        (env::CLIENT_SECRET, ""),
    ]
    .into_iter()
    .collect();
    ActionEnvironment::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
}

#[test]
fn empty_environment_values_are_absent() {
    let env = full_env();
    assert_eq!(env.app_client_id.as_deref(), Some("client"));
    assert_eq!(env.app_client_secret, None);
}

#[test]
fn github_cut_out_withholds_tokens() {
    let cut_outs = ActionCutOuts {
        disable_github_operations: true,
        ..Default::default()
    };
    let env = full_env().gated(&cut_outs);

    assert_eq!(env.github_token, None);
    assert_eq!(env.api_token, None);
    assert!(env.stored_token_response.is_some());
    assert_eq!(env.github_repository.as_deref(), Some("owner/repo"));
}

#[test]
fn stored_token_cut_out_withholds_token_response() {
    let cut_outs = ActionCutOuts {
        disable_stored_token_discovery: true,
        ..Default::default()
    };
    let env = full_env().gated(&cut_outs);

    assert_eq!(env.stored_token_response, None);
    assert!(env.github_token.is_some());
}

#[test]
fn debug_output_masks_secrets() {
    let rendered = format!("{:?}", full_env());
    assert!(!rendered.contains("gh-token"));
    assert!(!rendered.contains("api-token"));
    assert!(rendered.contains("owner/repo"));
}

#[test]
fn snapshot_serializes_milestones_by_name() {
    let mut registry = Registry::new();
    registry.activate(Milestone::Sync, 500, 10);

    let snapshot = IntelligenceSnapshot {
        milestones: registry.snapshot(),
        config_json: Config::default().to_json().unwrap(),
        environment: ActionEnvironment::default(),
    };

    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["milestones"]["Sync"]["condition"], "Running");
    assert_eq!(value["milestones"]["Sync"]["process_id"], 500);
    assert_eq!(
        snapshot.status(Milestone::InitialSetup).condition,
        MilestoneCondition::NotStarted
    );
    assert_eq!(snapshot.config().unwrap(), Config::default());
}
