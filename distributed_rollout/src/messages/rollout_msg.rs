//! Rollout request/result messages.
//!
//! A rollout round is identified by a `(rollout_index, segment_index)` pair.
//! Peers echo the pair of the instruction they served so the coordinator can
//! match results without relying on arrival order.

use super::envelope::{MsgTag, SessionKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named scalar parameters (exploration settings, environment metrics).
pub type ParamMap = BTreeMap<String, f64>;

/// Instruction broadcast to every peer at the start of a collection round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutInstruction<M> {
    /// Rollout (episode) this segment belongs to.
    pub rollout_index: u64,
    /// Segment within the rollout.
    pub segment_index: u64,
    /// Environment steps each peer should take.
    pub num_steps: usize,
    /// Model snapshot the peers should act with.
    pub models: Option<M>,
    /// Exploration parameters to apply before stepping.
    pub exploration_params: Option<ParamMap>,
    /// Whether peers should attach environment metrics to their results.
    pub return_env_metrics: bool,
}

impl<M> RolloutInstruction<M> {
    /// Create an instruction with no model snapshot or exploration params.
    pub fn new(rollout_index: u64, segment_index: u64, num_steps: usize) -> Self {
        Self {
            rollout_index,
            segment_index,
            num_steps,
            models: None,
            exploration_params: None,
            return_env_metrics: false,
        }
    }
}

/// Result sent back by a peer for one instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutResult<E> {
    /// Rollout index of the instruction that was served.
    pub rollout_index: u64,
    /// Segment index of the instruction that was served.
    pub segment_index: u64,
    /// Number of experiences in `experiences`.
    pub num_experiences: usize,
    /// Environment steps actually taken.
    pub num_steps: usize,
    /// Whether the environment reached the end of its episode.
    pub env_end: bool,
    /// Episode reward, reported when `env_end` is set.
    pub total_reward: Option<f64>,
    /// Opaque experience batch.
    pub experiences: E,
    /// Environment metrics, when requested by the instruction.
    pub env_metrics: Option<ParamMap>,
}

impl<E> RolloutResult<E> {
    /// Create a result for the given round with no reward or metrics attached.
    pub fn new(
        rollout_index: u64,
        segment_index: u64,
        experiences: E,
        num_experiences: usize,
        num_steps: usize,
    ) -> Self {
        Self {
            rollout_index,
            segment_index,
            num_experiences,
            num_steps,
            env_end: false,
            total_reward: None,
            experiences,
            env_metrics: None,
        }
    }

    /// Mark the episode as finished with the given total reward.
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
}

/// Commands the coordinator broadcasts to its peer group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PeerCommand<M> {
    /// Run a rollout segment.
    Rollout(RolloutInstruction<M>),
    /// Shut down. No acknowledgement is sent.
    Exit,
}

impl<M> PeerCommand<M> {
    /// Tag carried by this command on the wire.
    pub fn tag(&self) -> MsgTag {
        match self {
            PeerCommand::Rollout(_) => MsgTag::Rollout,
            PeerCommand::Exit => MsgTag::Exit,
        }
    }

    /// Session kind of this command.
    pub fn session(&self) -> SessionKind {
        match self {
            PeerCommand::Rollout(_) => SessionKind::Task,
            PeerCommand::Exit => SessionKind::Notification,
        }
    }
}
