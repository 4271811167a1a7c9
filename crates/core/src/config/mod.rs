// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributable configuration
//!
//! The daemon reads this from TOML on disk and hands it to every stage
//! process as a JSON string inside the intelligence snapshot.

mod lifetime;

pub use lifetime::MilestoneLifetimeConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("invalid TOML in {0}: {1}")]
    Toml(PathBuf, #[source] toml::de::Error),
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Feature switches that let an operator disable parts of the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionCutOuts {
    /// Skip every GitHub API call and withhold GitHub tokens from stages
    pub disable_github_operations: bool,
    /// Do not hand a previously stored OAuth token response to stages
    pub disable_stored_token_discovery: bool,
    /// Skip the initial setup milestone entirely
    pub disable_initial_setup_milestone: bool,
    /// Do not use GitHub endpoints outside the supported client surface
    pub disable_unsupported_github_api: bool,
}

/// Top-level configuration shared with every milestone process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub action_cut_outs: ActionCutOuts,
    pub milestone_lifetime: MilestoneLifetimeConfig,
}

impl Config {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Toml(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the lifetime thresholds make sense together
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.milestone_lifetime.validate()
    }

    /// Encode for distribution inside a snapshot
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a distributed configuration blob
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
