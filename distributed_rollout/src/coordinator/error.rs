//! Error types for the rollout coordinator.

use super::config::ConfigError;
use crate::transport::TransportError;
use std::fmt;

/// Errors returned by [`RolloutCoordinator`](super::RolloutCoordinator).
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    /// Configuration failed validation.
    Config(ConfigError),
    /// The transport knows no peer group with this role.
    UnrecognizedPeerGroup(String),
    /// The peer group does not have the configured number of members.
    PeerCountMismatch {
        role: String,
        expected: usize,
        actual: usize,
    },
    /// The transport failed.
    Transport(TransportError),
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorError::Config(e) => write!(f, "Invalid configuration: {}", e),
            CoordinatorError::UnrecognizedPeerGroup(role) => {
                write!(f, "Unrecognized peer group '{}'", role)
            }
            CoordinatorError::PeerCountMismatch {
                role,
                expected,
                actual,
            } => write!(
                f,
                "Expected {} peers with role '{}', found {}",
                expected, role, actual
            ),
            CoordinatorError::Transport(e) => write!(f, "Transport error: {}", e),
        }
    }
}

impl std::error::Error for CoordinatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoordinatorError::Config(e) => Some(e),
            CoordinatorError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CoordinatorError {
    fn from(e: ConfigError) -> Self {
        CoordinatorError::Config(e)
    }
}

impl From<TransportError> for CoordinatorError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::UnknownGroup(role) => CoordinatorError::UnrecognizedPeerGroup(role),
            other => CoordinatorError::Transport(other),
        }
    }
}
