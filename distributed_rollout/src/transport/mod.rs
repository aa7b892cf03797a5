//! Transport contract used by the rollout coordinator.
//!
//! The coordinator only needs three things from its transport:
//! - resolve a role label to the peers that carry it
//! - one-way broadcast of a command to every peer of a role
//! - blocking receive of the next result addressed to this node
//!
//! Serialization, socket retries and timeouts belong to the implementation.
//! [`ChannelTransport`] is the in-process implementation over crossbeam
//! channels.

pub mod channel;

use crate::messages::{Envelope, PeerCommand, PeerId, RolloutResult};
use std::fmt;

pub use channel::{ChannelTransport, ChannelTransportBuilder, PeerEndpoint};

/// Errors reported by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// No peer group is registered under the role label.
    UnknownGroup(String),
    /// Every sender feeding this node's inbox is gone.
    Disconnected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::UnknownGroup(role) => write!(f, "unknown peer group '{}'", role),
            TransportError::Disconnected => write!(f, "transport disconnected"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Message-level transport between a coordinator and its peer groups.
///
/// `M` is the model snapshot type carried by rollout instructions and `E` the
/// experience batch type carried by results.
pub trait Transport<M, E> {
    /// Identity of this node.
    fn node(&self) -> &PeerId;

    /// Peers registered under `role`.
    fn peers(&self, role: &str) -> Result<Vec<PeerId>, TransportError>;

    /// Send `command` to every peer of `role`. Does not wait for replies.
    fn broadcast(&self, role: &str, command: PeerCommand<M>) -> Result<(), TransportError>;

    /// Block until the next result addressed to this node arrives.
    fn receive(&self) -> Result<Envelope<RolloutResult<E>>, TransportError>;
}
