//! Pool of rollout actors for an in-process peer group.
//!
//! Spawns one [`RolloutActor`] per [`PeerEndpoint`] and aggregates their stats.

use super::actor::{ActorConfig, ActorHandle, RolloutActor, RolloutOutcome};
use crate::messages::{ActorStats, PeerId, RolloutInstruction};
use crate::transport::PeerEndpoint;

/// Actors serving one peer group.
pub struct ActorPool {
    handles: Vec<ActorHandle>,
}

impl ActorPool {
    /// Spawn an actor for every endpoint.
    ///
    /// `make_rollout_fn` builds each actor's rollout function from its peer id.
    /// If a spawn fails, the actors already started keep running until their
    /// endpoints receive `Exit` or the coordinator side is dropped.
    pub fn spawn<M, E, F, G>(
        config: ActorConfig,
        endpoints: Vec<PeerEndpoint<M, E>>,
        mut make_rollout_fn: G,
    ) -> std::io::Result<Self>
    where
        M: Send + 'static,
        E: Send + 'static,
        F: FnMut(&RolloutInstruction<M>) -> RolloutOutcome<E> + Send + 'static,
        G: FnMut(&PeerId) -> F,
    {
        let mut handles = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let rollout_fn = make_rollout_fn(endpoint.id());
            handles.push(RolloutActor::new(config.clone()).spawn(endpoint, rollout_fn)?);
        }
        log::info!("Spawned {} rollout actors", handles.len());
        Ok(Self { handles })
    }

    /// Get number of actors.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if pool is empty.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Peers served by the pool.
    pub fn peers(&self) -> impl Iterator<Item = &PeerId> {
        self.handles.iter().map(|h| &h.peer)
    }

    /// Drain every queued stats report (non-blocking).
    pub fn collect_stats(&self) -> Vec<ActorStats> {
        let mut all_stats = Vec::new();
        for handle in &self.handles {
            while let Some(stats) = handle.get_stats() {
                all_stats.push(stats);
            }
        }
        all_stats
    }

    /// Get number of finished actors.
    pub fn finished_count(&self) -> usize {
        self.handles.iter().filter(|h| h.is_finished()).count()
    }

    /// Join all actor threads, returning each actor's last stats report.
    ///
    /// Threads only finish once told to exit or disconnected, so send `Exit`
    /// (or drop the transport) first.
    pub fn join_all(self) -> Vec<std::thread::Result<Option<ActorStats>>> {
        self.handles.into_iter().map(ActorHandle::join).collect()
    }
}

/// Combine per-actor stats into pool totals.
///
/// The average reward is weighted by each actor's valid episodes.
pub fn aggregate_stats(stats: &[ActorStats]) -> ActorStats {
    let mut total = ActorStats::new(PeerId::new("pool"));
    let mut reward_sum = 0.0;

    for s in stats {
        total.rollouts = total.rollouts.saturating_add(s.rollouts);
        total.steps = total.steps.saturating_add(s.steps);
        total.experiences = total.experiences.saturating_add(s.experiences);
        total.episodes = total.episodes.saturating_add(s.episodes);
        total.valid_episodes = total.valid_episodes.saturating_add(s.valid_episodes);
        total.filtered_episodes = total.filtered_episodes.saturating_add(s.filtered_episodes);
        reward_sum += s.avg_episode_reward * s.valid_episodes as f64;
    }

    if total.valid_episodes > 0 {
        total.avg_episode_reward = reward_sum / total.valid_episodes as f64;
    }
    total.recent_episode_reward = stats.last().map_or(0.0, |s| s.recent_episode_reward);
    total
}
