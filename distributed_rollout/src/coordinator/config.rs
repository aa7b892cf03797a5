//! Configuration for the rollout coordinator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role label peers register under unless configured otherwise.
pub const DEFAULT_PEER_ROLE: &str = "actor";

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count parameter must be positive.
    InvalidCount {
        field: &'static str,
        value: usize,
    },
    /// A name parameter must not be empty.
    EmptyField {
        field: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCount { field, value } => {
                write!(f, "{} must be > 0, got {}", field, value)
            }
            ConfigError::EmptyField { field } => write!(f, "{} must not be empty", field),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for a [`RolloutCoordinator`](super::RolloutCoordinator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Name of the group the coordinator and its peers belong to
    pub group_name: String,
    /// Expected number of peers carrying `peer_role`
    pub num_peers: usize,
    /// Role label the peers are registered under
    pub peer_role: String,
    /// Log rollout headers and per-result environment metrics at info level
    pub log_env_metrics: bool,
}

impl CoordinatorConfig {
    /// Create a config for `num_peers` peers under the default role.
    pub fn new(group_name: impl Into<String>, num_peers: usize) -> Self {
        Self {
            group_name: group_name.into(),
            num_peers,
            peer_role: DEFAULT_PEER_ROLE.to_string(),
            log_env_metrics: false,
        }
    }

    /// Set the peer role label.
    pub fn with_peer_role(mut self, role: impl Into<String>) -> Self {
        self.peer_role = role.into();
        self
    }

    /// Enable or disable environment metric logging.
    pub fn with_log_env_metrics(mut self, enabled: bool) -> Self {
        self.log_env_metrics = enabled;
        self
    }

    /// Validate all configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_name.is_empty() {
            return Err(ConfigError::EmptyField {
                field: "group_name",
            });
        }
        if self.peer_role.is_empty() {
            return Err(ConfigError::EmptyField { field: "peer_role" });
        }
        if self.num_peers == 0 {
            return Err(ConfigError::InvalidCount {
                field: "num_peers",
                value: 0,
            });
        }
        Ok(())
    }
}
