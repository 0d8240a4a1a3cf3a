//! Autopilot configuration, loadable from JSON.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::autopilot::reward::{RewardWeights, StallGuard};
use crate::error::ConfigError;

/// What a tick does besides choosing a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutopilotMode {
    /// Score every tick, report fitness to the policy, end stalled episodes.
    #[default]
    Training,
    /// Decide only.
    Tournament,
}

/// Fallback when the policy returns something unusable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidOutputAction {
    /// Surface the error to the caller.
    #[default]
    Reject,
    /// Keep moving the way the agent already faces.
    KeepHeading,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    pub mode: AutopilotMode,
    pub reward: RewardWeights,
    /// Ticks without a base score increase before the episode is ended.
    pub stall_limit: u32,
    pub invalid_output: InvalidOutputAction,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            mode: AutopilotMode::default(),
            reward: RewardWeights::default(),
            stall_limit: StallGuard::DEFAULT_LIMIT,
            invalid_output: InvalidOutputAction::default(),
        }
    }
}

impl AutopilotConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn stall_guard(&self) -> StallGuard {
        StallGuard::new(self.stall_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_gives_defaults() {
        let config = AutopilotConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AutopilotConfig::default());
        assert_eq!(config.stall_limit, 600);
        assert_eq!(config.mode, AutopilotMode::Training);
        assert_eq!(config.invalid_output, InvalidOutputAction::Reject);
    }

    #[test]
    fn partial_override() {
        let config = AutopilotConfig::from_json_str(
            r#"{"mode": "tournament", "invalid_output": "keep_heading", "reward": {"level_bonus": 1000.0}}"#,
        )
        .unwrap();
        assert_eq!(config.mode, AutopilotMode::Tournament);
        assert_eq!(config.invalid_output, InvalidOutputAction::KeepHeading);
        assert_eq!(config.reward.level_bonus, 1000.0);
        assert_eq!(config.reward.minor_item, 50.0);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            AutopilotConfig::from_json_str(r#"{"mode": "sleepwalk"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"stall_limit": 42}}"#).unwrap();
        let config = AutopilotConfig::load(file.path()).unwrap();
        assert_eq!(config.stall_limit, 42);
        assert_eq!(config.stall_guard().limit(), 42);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AutopilotConfig::load(Path::new("/nonexistent/autopilot.json")).unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("autopilot.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
