//! # Distributed Rollout: coordinated experience collection
//!
//! A coordinator broadcasts rollout instructions to a group of peers, filters
//! their results by `(rollout_index, segment_index)`, stops at a quorum and
//! streams each accepted batch to the caller, who writes it into a
//! fixed-schema [`ExperienceStore`].
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Thread 1          Thread 2          Thread N                       │
//! │  ┌────────┐        ┌────────┐        ┌────────┐                     │
//! │  │actor.0 │        │actor.1 │        │actor.N │   RolloutActor      │
//! │  └───┬────┘        └───┬────┘        └───┬────┘                     │
//! │      ▲ RolloutResult   │                 │                          │
//! │      │                 │                 │                          │
//! │      └──── Transport (broadcast / receive) ──┘                      │
//! │                        │                                            │
//! │              ┌─────────▼─────────┐                                  │
//! │              │RolloutCoordinator │  filter + quorum + metrics       │
//! │              └─────────┬─────────┘                                  │
//! │                        │ AcceptedBatch (streamed)                   │
//! │              ┌─────────▼─────────┐                                  │
//! │              │  ExperienceStore  │  rolling / random overwrite      │
//! │              └───────────────────┘                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use distributed_rollout::{
//!     ChannelTransportBuilder, CollectRequest, CoordinatorConfig, ExperienceStore,
//!     OverwritePolicy, RolloutCoordinator,
//! };
//!
//! let (transport, endpoints) = ChannelTransportBuilder::new("learner")
//!     .with_group("actor", 4)
//!     .build();
//! // hand `endpoints` to RolloutActors ...
//!
//! let mut coordinator = RolloutCoordinator::new(CoordinatorConfig::new("cartpole", 4), transport)?;
//! let mut store = ExperienceStore::bounded(["S", "A", "R"], 10_000, OverwritePolicy::Rolling)?;
//!
//! for batch in coordinator.collect(CollectRequest::new(0, 0, 128))? {
//!     store.put(batch?.experiences, None)?;
//! }
//! coordinator.exit();
//! ```

pub mod actors;
pub mod coordinator;
pub mod messages;
pub mod metrics;
pub mod store;
pub mod transport;

pub use actors::{aggregate_stats, ActorConfig, ActorHandle, ActorPool, RolloutActor, RolloutOutcome};
pub use coordinator::{
    AcceptedBatch, Collect, CollectRequest, ConfigError, CoordinatorConfig, CoordinatorError,
    RolloutCoordinator, DEFAULT_PEER_ROLE,
};
pub use messages::{
    ActorStats, Envelope, MsgTag, ParamMap, PeerCommand, PeerId, RolloutInstruction,
    RolloutResult, SessionKind,
};
pub use metrics::CollectionMetrics;
pub use store::{
    shared_store, Batch, Capacity, Column, Columns, ExperienceStore, OverwritePolicy, Record,
    SharedExperienceStore, StoreConfig, StoreError,
};
pub use transport::{ChannelTransport, ChannelTransportBuilder, PeerEndpoint, Transport, TransportError};
