//! Rollout coordinator: broadcast, filter, quorum.
//!
//! One collection round:
//!
//! ```text
//! collect(request)
//!   │
//!   ├─ broadcast Rollout(rollout_index, segment_index) to every peer
//!   │
//!   └─ Collect iterator, per next():
//!        while finished < required_finishes:
//!          receive ──> wrong rollout_index ............ drop
//!                  ──> segment matches ................ finished += 1, yield
//!                  ──> stale segment, keep stale ...... yield (not counted)
//!                  ──> stale segment, discard stale ... drop
//! ```
//!
//! Results left in the inbox once quorum is reached stay queued; the next
//! round drops them by rollout index.

use super::config::CoordinatorConfig;
use super::error::CoordinatorError;
use crate::messages::{Envelope, ParamMap, PeerCommand, PeerId, RolloutInstruction, RolloutResult};
use crate::metrics::CollectionMetrics;
use crate::transport::{Transport, TransportError};
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// Parameters of one collection round.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectRequest<M> {
    /// Rollout (episode) index results must carry
    pub rollout_index: u64,
    /// Segment index results must carry to count toward quorum
    pub segment_index: u64,
    /// Environment steps each peer should take
    pub num_steps: usize,
    /// Model snapshot sent to the peers
    pub models: Option<M>,
    /// Exploration parameters sent to the peers
    pub exploration_params: Option<ParamMap>,
    /// Matching results that end the round; `None` waits for every peer
    pub required_finishes: Option<usize>,
    /// Drop results from an earlier segment of the same rollout
    pub discard_stale: bool,
    /// Ask peers to attach environment metrics
    pub return_env_metrics: bool,
}

impl<M> CollectRequest<M> {
    /// Request `num_steps` steps for the given round.
    pub fn new(rollout_index: u64, segment_index: u64, num_steps: usize) -> Self {
        Self {
            rollout_index,
            segment_index,
            num_steps,
            models: None,
            exploration_params: None,
            required_finishes: None,
            discard_stale: true,
            return_env_metrics: false,
        }
    }

    /// Send a model snapshot with the instruction.
    pub fn with_models(mut self, models: M) -> Self {
        self.models = Some(models);
        self
    }

    /// Send exploration parameters with the instruction.
    pub fn with_exploration_params(mut self, params: ParamMap) -> Self {
        self.exploration_params = Some(params);
        self
    }

    /// End the round after `n` matching results.
    pub fn with_required_finishes(mut self, n: usize) -> Self {
        self.required_finishes = Some(n);
        self
    }

    /// Set whether stale-segment results are dropped.
    pub fn with_discard_stale(mut self, discard: bool) -> Self {
        self.discard_stale = discard;
        self
    }

    /// Set whether peers attach environment metrics.
    pub fn with_return_env_metrics(mut self, enabled: bool) -> Self {
        self.return_env_metrics = enabled;
        self
    }

    fn instruction(self) -> RolloutInstruction<M> {
        RolloutInstruction {
            rollout_index: self.rollout_index,
            segment_index: self.segment_index,
            num_steps: self.num_steps,
            models: self.models,
            exploration_params: self.exploration_params,
            return_env_metrics: self.return_env_metrics,
        }
    }
}

/// A result accepted during a collection round.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedBatch<E> {
    /// Experience batch sent by the peer
    pub experiences: E,
    /// Whether the peer's episode ended
    pub env_end: bool,
    /// Peer that sent the batch
    pub source: PeerId,
    /// Segment the batch belongs to; differs from the request for stale batches
    pub segment_index: u64,
    /// Environment metrics, if the peer attached any
    pub env_metrics: Option<ParamMap>,
}

impl<E> AcceptedBatch<E> {
    /// Split into `(experiences, env_end)`.
    pub fn into_pair(self) -> (E, bool) {
        (self.experiences, self.env_end)
    }
}

impl<E> From<AcceptedBatch<E>> for (E, bool) {
    fn from(batch: AcceptedBatch<E>) -> Self {
        batch.into_pair()
    }
}

/// Issues rollout instructions to a peer group and streams back the results.
///
/// `T` is the transport, `M` the model snapshot type and `E` the experience
/// batch type.
pub struct RolloutCoordinator<T, M, E> {
    config: CoordinatorConfig,
    transport: T,
    peers: Vec<PeerId>,
    metrics: CollectionMetrics,
    _marker: PhantomData<fn() -> (M, E)>,
}

impl<T, M, E> RolloutCoordinator<T, M, E>
where
    T: Transport<M, E>,
{
    /// Validate `config` and resolve the peer group through `transport`.
    ///
    /// Peer liveness is not checked.
    pub fn new(config: CoordinatorConfig, transport: T) -> Result<Self, CoordinatorError> {
        config.validate()?;

        let peers = transport.peers(&config.peer_role)?;
        if peers.len() != config.num_peers {
            return Err(CoordinatorError::PeerCountMismatch {
                role: config.peer_role.clone(),
                expected: config.num_peers,
                actual: peers.len(),
            });
        }

        log::info!(
            "Coordinator {} ready for group '{}' with {} '{}' peers",
            transport.node(),
            config.group_name,
            peers.len(),
            config.peer_role
        );

        Ok(Self {
            config,
            transport,
            peers,
            metrics: CollectionMetrics::new(),
            _marker: PhantomData,
        })
    }

    /// Broadcast a rollout instruction and return the stream of accepted batches.
    ///
    /// The returned iterator blocks on the transport in `next()`. It ends once
    /// `required_finishes` results with the requested segment index have
    /// arrived, or after yielding a transport error.
    pub fn collect(
        &mut self,
        request: CollectRequest<M>,
    ) -> Result<Collect<'_, T, M, E>, CoordinatorError> {
        let required_finishes = request.required_finishes.unwrap_or(self.peers.len());
        let discard_stale = request.discard_stale;
        let instruction = request.instruction();

        if self.config.log_env_metrics {
            log::info!(
                "Rollout {} segment {}: {} steps, exploration {:?}",
                instruction.rollout_index,
                instruction.segment_index,
                instruction.num_steps,
                instruction.exploration_params
            );
        }

        let rollout_index = instruction.rollout_index;
        let segment_index = instruction.segment_index;
        self.transport
            .broadcast(&self.config.peer_role, PeerCommand::Rollout(instruction))?;

        log::debug!(
            "Collecting rollout {} segment {} from {} peers, quorum {}",
            rollout_index,
            segment_index,
            self.peers.len(),
            required_finishes
        );

        Ok(Collect {
            coordinator: self,
            rollout_index,
            segment_index,
            required_finishes,
            discard_stale,
            finished: 0,
            closed: false,
        })
    }

    /// Tell every peer to shut down.
    ///
    /// One-way; delivery failures are logged and otherwise ignored, so this
    /// can be called more than once.
    pub fn exit(&self) {
        match self.transport.broadcast(&self.config.peer_role, PeerCommand::Exit) {
            Ok(()) => log::info!("Sent exit to {} peers", self.peers.len()),
            Err(e) => log::warn!("Exit broadcast failed: {}", e),
        }
    }
}

impl<T, M, E> RolloutCoordinator<T, M, E> {
    /// Cumulative counters over all accepted results.
    pub fn metrics(&self) -> &CollectionMetrics {
        &self.metrics
    }

    /// Peers resolved at construction.
    pub fn peers(&self) -> &[PeerId] {
        &self.peers
    }

    /// Number of peers in the group.
    pub fn num_peers(&self) -> usize {
        self.peers.len()
    }

    /// Coordinator configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn record(&mut self, source: &PeerId, result: &RolloutResult<E>) {
        self.metrics
            .record_result(result.num_experiences, result.num_steps);

        if result.env_end {
            if let Some(reward) = result.total_reward {
                let total = self.metrics.record_episode_reward(source, reward);
                log::info!(
                    "Env {} finished rollout {} with reward {:.3} (total {:.3})",
                    source,
                    result.rollout_index,
                    reward,
                    total
                );
            }
        }
    }
}

/// Stream of accepted batches for one collection round.
///
/// Holds the coordinator mutably, so a second round cannot start until this
/// one is dropped.
pub struct Collect<'a, T, M, E> {
    coordinator: &'a mut RolloutCoordinator<T, M, E>,
    rollout_index: u64,
    segment_index: u64,
    required_finishes: usize,
    discard_stale: bool,
    finished: usize,
    closed: bool,
}

impl<'a, T, M, E> Collect<'a, T, M, E> {
    /// Results with the requested segment index received so far.
    pub fn finished(&self) -> usize {
        self.finished
    }

    /// Matching results that end the round.
    pub fn required_finishes(&self) -> usize {
        self.required_finishes
    }

    /// Whether the round is over.
    pub fn is_done(&self) -> bool {
        self.closed || self.finished >= self.required_finishes
    }

    fn accept(&mut self, envelope: Envelope<RolloutResult<E>>) -> Option<AcceptedBatch<E>> {
        let Envelope { source, body: result, .. } = envelope;

        if result.rollout_index != self.rollout_index {
            log::debug!(
                "Dropped result from {} for rollout {} (collecting rollout {})",
                source,
                result.rollout_index,
                self.rollout_index
            );
            return None;
        }

        if self.coordinator.config.log_env_metrics {
            if let Some(env_metrics) = &result.env_metrics {
                log::info!(
                    "Env metrics from {} (rollout {} segment {}): {:?}",
                    source,
                    result.rollout_index,
                    result.segment_index,
                    env_metrics
                );
            }
        }

        if result.segment_index == self.segment_index {
            self.finished += 1;
        } else if self.discard_stale {
            log::debug!(
                "Dropped stale result from {} for segment {} (collecting segment {})",
                source,
                result.segment_index,
                self.segment_index
            );
            return None;
        }

        self.coordinator.record(&source, &result);

        Some(AcceptedBatch {
            experiences: result.experiences,
            env_end: result.env_end,
            source,
            segment_index: result.segment_index,
            env_metrics: result.env_metrics,
        })
    }
}

impl<'a, T, M, E> Iterator for Collect<'a, T, M, E>
where
    T: Transport<M, E>,
{
    type Item = Result<AcceptedBatch<E>, TransportError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.is_done() {
            match self.coordinator.transport.receive() {
                Ok(envelope) => {
                    if let Some(batch) = self.accept(envelope) {
                        return Some(Ok(batch));
                    }
                }
                Err(e) => {
                    log::warn!(
                        "Transport closed while collecting rollout {} segment {}: {}",
                        self.rollout_index,
                        self.segment_index,
                        e
                    );
                    self.closed = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

impl<'a, T, M, E> FusedIterator for Collect<'a, T, M, E> where T: Transport<M, E> {}
