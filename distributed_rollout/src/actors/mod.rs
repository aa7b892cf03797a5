//! Peer-side rollout actors.
//!
//! - `RolloutActor`: answers rollout instructions on its own thread
//! - `ActorPool`: one actor per endpoint of an in-process peer group

pub mod actor;
pub mod actor_pool;

pub use actor::{ActorConfig, ActorHandle, RolloutActor, RolloutOutcome};
pub use actor_pool::{aggregate_stats, ActorPool};

// Re-export from messages for convenience
pub use crate::messages::ActorStats;
