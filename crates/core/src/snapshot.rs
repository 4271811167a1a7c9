// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intelligence snapshot exchanged over the RPC boundary

use crate::config::{ActionCutOuts, Config, ConfigError};
use crate::milestone::{Milestone, MilestoneStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Environment variables passed through to stages untouched
pub mod env {
    pub const GITHUB_TOKEN: &str = "WP_GITHUB_TOKEN";
    pub const API_TOKEN: &str = "WP_API_TOKEN";
    pub const STORED_TOKEN_RESPONSE: &str = "WP_STORED_TOKEN_RESPONSE";
    pub const CLIENT_ID: &str = "WP_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "WP_CLIENT_SECRET";
    pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
}

/// Opaque credentials owned by the GitHub and OAuth collaborators
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionEnvironment {
    pub github_repository: Option<String>,
    pub github_token: Option<String>,
    pub api_token: Option<String>,
    pub stored_token_response: Option<String>,
    pub app_client_id: Option<String>,
    pub app_client_secret: Option<String>,
}

impl ActionEnvironment {
    /// Read the pass-through values from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup; empty values count as absent
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            github_repository: get(env::GITHUB_REPOSITORY),
            github_token: get(env::GITHUB_TOKEN),
            api_token: get(env::API_TOKEN),
            stored_token_response: get(env::STORED_TOKEN_RESPONSE),
            app_client_id: get(env::CLIENT_ID),
            app_client_secret: get(env::CLIENT_SECRET),
        }
    }

    /// Withhold the values an operator has cut out
    pub fn gated(&self, cut_outs: &ActionCutOuts) -> Self {
        let mut env = self.clone();
        if cut_outs.disable_github_operations {
            env.github_token = None;
            env.api_token = None;
        }
        if cut_outs.disable_stored_token_discovery {
            env.stored_token_response = None;
        }
        env
    }
}

// Secrets stay out of logs
impl fmt::Debug for ActionEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(v: &Option<String>) -> &'static str {
            if v.is_some() {
                "<set>"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("ActionEnvironment")
            .field("github_repository", &self.github_repository)
            .field("github_token", &mask(&self.github_token))
            .field("api_token", &mask(&self.api_token))
            .field("stored_token_response", &mask(&self.stored_token_response))
            .field("app_client_id", &self.app_client_id)
            .field("app_client_secret", &mask(&self.app_client_secret))
            .finish()
    }
}

/// Point-in-time copy of the registry plus distributable configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelligenceSnapshot {
    pub milestones: BTreeMap<Milestone, MilestoneStatus>,
    /// JSON-encoded [`Config`]
    pub config_json: String,
    pub environment: ActionEnvironment,
}

impl IntelligenceSnapshot {
    pub fn status(&self, milestone: Milestone) -> MilestoneStatus {
        self.milestones.get(&milestone).copied().unwrap_or_default()
    }

    /// Decode the distributed configuration
    pub fn config(&self) -> Result<Config, ConfigError> {
        Config::from_json(&self.config_json)
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
