//! Cumulative counters for rollout collection.

use crate::messages::PeerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Totals over every result the coordinator has accepted.
///
/// Counters only grow. They are owned by a single coordinator and reset only
/// by creating a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetrics {
    /// Experiences reported by accepted results
    total_experiences_collected: usize,
    /// Environment steps reported by accepted results
    total_env_steps: usize,
    /// Summed episode reward per peer, added when an episode ends
    total_reward_per_env: BTreeMap<PeerId, f64>,
}

impl CollectionMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one accepted result.
    pub fn record_result(&mut self, num_experiences: usize, num_steps: usize) {
        self.total_experiences_collected =
            self.total_experiences_collected.saturating_add(num_experiences);
        self.total_env_steps = self.total_env_steps.saturating_add(num_steps);
    }

    /// Add an ended episode's reward to `source`'s total and return the new total.
    pub fn record_episode_reward(&mut self, source: &PeerId, reward: f64) -> f64 {
        let total = self
            .total_reward_per_env
            .entry(source.clone())
            .or_insert(0.0);
        *total += reward;
        *total
    }

    /// Get total experiences collected.
    pub fn total_experiences_collected(&self) -> usize {
        self.total_experiences_collected
    }

    /// Get total environment steps.
    pub fn total_env_steps(&self) -> usize {
        self.total_env_steps
    }

    /// Get summed reward per peer.
    pub fn total_reward_per_env(&self) -> &BTreeMap<PeerId, f64> {
        &self.total_reward_per_env
    }

    /// Summed reward for one peer, if it has finished an episode.
    pub fn total_reward(&self, source: &PeerId) -> Option<f64> {
        self.total_reward_per_env.get(source).copied()
    }
}
