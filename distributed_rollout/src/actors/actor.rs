//! Peer-side rollout actor.
//!
//! An actor owns one [`PeerEndpoint`] and answers every `Rollout` command with
//! exactly one [`RolloutResult`] echoing the instruction's indices. It stops on
//! `Exit` or when the coordinator side of the channel is dropped.

use crate::messages::{ActorStats, ParamMap, PeerCommand, PeerId, RolloutInstruction, RolloutResult};
use crate::transport::PeerEndpoint;
use crossbeam_channel::Receiver;
use std::thread::JoinHandle;

/// What a rollout function produced for one instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct RolloutOutcome<E> {
    /// Experience batch to send back
    pub experiences: E,
    /// Number of experiences in the batch
    pub num_experiences: usize,
    /// Environment steps actually taken
    pub num_steps: usize,
    /// Whether the episode ended during this segment
    pub env_end: bool,
    /// Episode reward, when the episode ended
    pub total_reward: Option<f64>,
    /// Environment metrics; only sent if the instruction asked for them
    pub env_metrics: Option<ParamMap>,
}

impl<E> RolloutOutcome<E> {
    /// Outcome of a segment that did not end the episode.
    pub fn new(experiences: E, num_experiences: usize, num_steps: usize) -> Self {
        Self {
            experiences,
            num_experiences,
            num_steps,
            env_end: false,
            total_reward: None,
            env_metrics: None,
        }
    }

    /// Mark the episode as finished with its total reward.
    pub fn with_env_end(mut self, total_reward: f64) -> Self {
        self.env_end = true;
        self.total_reward = Some(total_reward);
        self
    }

    /// Attach environment metrics.
    pub fn with_env_metrics(mut self, metrics: ParamMap) -> Self {
        self.env_metrics = Some(metrics);
        self
    }

    fn into_result<M>(self, instruction: &RolloutInstruction<M>) -> RolloutResult<E> {
        RolloutResult {
            rollout_index: instruction.rollout_index,
            segment_index: instruction.segment_index,
            num_experiences: self.num_experiences,
            num_steps: self.num_steps,
            env_end: self.env_end,
            total_reward: self.total_reward,
            experiences: self.experiences,
            env_metrics: if instruction.return_env_metrics {
                self.env_metrics
            } else {
                None
            },
        }
    }
}

/// Actor configuration.
#[derive(Debug, Clone)]
pub struct ActorConfig {
    /// Rollouts between stats reports (0 = report only on shutdown)
    pub stats_interval: usize,
    /// Stats reports buffered before new ones are dropped
    pub stats_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10,
            stats_capacity: 100,
        }
    }
}

impl ActorConfig {
    /// Set the stats report interval.
    pub fn with_stats_interval(mut self, interval: usize) -> Self {
        self.stats_interval = interval;
        self
    }

    /// Set the stats channel capacity.
    pub fn with_stats_capacity(mut self, capacity: usize) -> Self {
        self.stats_capacity = capacity;
        self
    }
}

/// Handle to a spawned actor thread.
pub struct ActorHandle {
    /// Peer the actor serves
    pub peer: PeerId,
    /// Thread handle
    pub thread: JoinHandle<()>,
    /// Channel to receive stats from actor
    pub stats_rx: Receiver<ActorStats>,
}

impl ActorHandle {
    /// Get the oldest unread stats report (non-blocking).
    pub fn get_stats(&self) -> Option<ActorStats> {
        self.stats_rx.try_recv().ok()
    }

    /// Whether the actor thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the actor thread to finish and return its last stats report.
    pub fn join(self) -> std::thread::Result<Option<ActorStats>> {
        self.thread.join()?;
        Ok(self.stats_rx.try_iter().last())
    }
}

/// Rollout actor that serves one peer endpoint.
pub struct RolloutActor {
    config: ActorConfig,
}

impl RolloutActor {
    /// Create a new actor with given configuration.
    pub fn new(config: ActorConfig) -> Self {
        Self { config }
    }

    /// Spawn the actor thread.
    ///
    /// `rollout_fn` is called once per `Rollout` command, on the actor thread.
    pub fn spawn<M, E, F>(
        self,
        endpoint: PeerEndpoint<M, E>,
        mut rollout_fn: F,
    ) -> std::io::Result<ActorHandle>
    where
        M: Send + 'static,
        E: Send + 'static,
        F: FnMut(&RolloutInstruction<M>) -> RolloutOutcome<E> + Send + 'static,
    {
        let config = self.config;
        let peer = endpoint.id().clone();
        let (stats_tx, stats_rx) = crossbeam_channel::bounded(config.stats_capacity.max(1));

        let thread = std::thread::Builder::new()
            .name(format!("Rollout-Actor-{}", peer))
            .spawn(move || {
                let mut stats = ActorStats::new(endpoint.id().clone());

                loop {
                    let command = match endpoint.recv() {
                        Ok(envelope) => envelope.into_body(),
                        Err(_) => {
                            log::debug!("Actor {}: coordinator gone, stopping", endpoint.id());
                            break;
                        }
                    };

                    let instruction = match command {
                        PeerCommand::Rollout(instruction) => instruction,
                        PeerCommand::Exit => {
                            log::debug!("Actor {}: exit received", endpoint.id());
                            break;
                        }
                    };

                    let outcome = rollout_fn(&instruction);
                    stats.record_rollout(outcome.num_steps, outcome.num_experiences);
                    if outcome.env_end {
                        if let Some(reward) = outcome.total_reward {
                            stats.record_episode(reward);
                        }
                    }

                    if let Err(e) = endpoint.send_result(outcome.into_result(&instruction)) {
                        log::warn!("Actor {}: failed to send result: {}", endpoint.id(), e);
                        break;
                    }

                    if config.stats_interval > 0 && stats.rollouts % config.stats_interval == 0 {
                        let _ = stats_tx.try_send(stats.clone());
                    }
                }

                log::info!(
                    "Actor {} stopped after {} rollouts, {} steps",
                    endpoint.id(),
                    stats.rollouts,
                    stats.steps
                );
                let _ = stats_tx.try_send(stats);
            })?;

        Ok(ActorHandle {
            peer,
            thread,
            stats_rx,
        })
    }
}
