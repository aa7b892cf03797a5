//! Rollout coordination.
//!
//! - [`RolloutCoordinator`]: broadcasts rollout instructions to a peer group
//!   and streams back results that match the requested round
//! - [`CollectRequest`]: parameters of one round (indices, quorum, staleness)
//! - [`Collect`]: blocking iterator over the round's [`AcceptedBatch`]es
//! - [`CoordinatorConfig`]: group name, expected peer count and role

pub mod config;
pub mod error;
pub mod rollout_coordinator;

pub use config::{ConfigError, CoordinatorConfig, DEFAULT_PEER_ROLE};
pub use error::CoordinatorError;
pub use rollout_coordinator::{AcceptedBatch, Collect, CollectRequest, RolloutCoordinator};
