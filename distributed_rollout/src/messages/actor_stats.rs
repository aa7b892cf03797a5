//! Statistics reported by rollout actors.
//!
//! # Data Integrity
//!
//! Episode rewards that are not finite (NaN, Inf) are counted but kept out of
//! the running average, so one corrupted episode cannot poison the aggregate.

use super::envelope::PeerId;

/// Statistics reported by a rollout actor.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorStats {
    /// Peer the actor serves.
    pub peer: PeerId,

    /// Rollout instructions answered.
    pub rollouts: usize,

    /// Total environment steps taken.
    pub steps: usize,

    /// Total experiences sent to the coordinator.
    pub experiences: usize,

    /// Episodes completed (including those with non-finite rewards).
    pub episodes: usize,

    /// Episodes with finite rewards used in the average.
    pub valid_episodes: usize,

    /// Episodes whose reward was NaN or infinite.
    pub filtered_episodes: usize,

    /// Average episode reward over valid episodes.
    pub avg_episode_reward: f64,

    /// Most recent episode reward (may be non-finite).
    pub recent_episode_reward: f64,
}

impl ActorStats {
    /// Create empty stats for a peer.
    pub fn new(peer: PeerId) -> Self {
        Self {
            peer,
            rollouts: 0,
            steps: 0,
            experiences: 0,
            episodes: 0,
            valid_episodes: 0,
            filtered_episodes: 0,
            avg_episode_reward: 0.0,
            recent_episode_reward: 0.0,
        }
    }

    /// Record one answered rollout instruction.
    pub fn record_rollout(&mut self, steps: usize, experiences: usize) {
        self.rollouts = self.rollouts.saturating_add(1);
        self.steps = self.steps.saturating_add(steps);
        self.experiences = self.experiences.saturating_add(experiences);
    }

    /// Update stats after an episode completes.
    ///
    /// Uses Welford's incremental mean; non-finite rewards are tracked in
    /// `filtered_episodes` and skipped.
    pub fn record_episode(&mut self, reward: f64) {
        self.episodes += 1;
        self.recent_episode_reward = reward;

        if !reward.is_finite() {
            self.filtered_episodes += 1;
            return;
        }

        self.valid_episodes += 1;
        let delta = reward - self.avg_episode_reward;
        self.avg_episode_reward += delta / self.valid_episodes as f64;
    }

    /// Fraction of episodes filtered for non-finite rewards.
    pub fn filtered_fraction(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.filtered_episodes as f64 / self.episodes as f64
        }
    }
}
