//! In-process transport over crossbeam channels.
//!
//! Each peer gets its own command channel; all peers share one result channel
//! into the coordinator's inbox. Channels are unbounded so a broadcast never
//! blocks on a slow peer.
//!
//! ```text
//!                 broadcast                     receive
//! ChannelTransport ──┬──> actor.0 commands      inbox <──┬── actor.0 results
//!                    ├──> actor.1 commands               ├── actor.1 results
//!                    └──> actor.N commands               └── actor.N results
//! ```

use super::{Transport, TransportError};
use crate::messages::{Envelope, MsgTag, PeerCommand, PeerId, RolloutResult, SessionKind};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::collections::HashMap;

struct PeerLink<M> {
    id: PeerId,
    tx: Sender<Envelope<PeerCommand<M>>>,
}

/// Coordinator side of an in-process peer group.
pub struct ChannelTransport<M, E> {
    node: PeerId,
    groups: HashMap<String, Vec<PeerLink<M>>>,
    inbox: Receiver<Envelope<RolloutResult<E>>>,
}

/// Peer side of an in-process peer group.
pub struct PeerEndpoint<M, E> {
    id: PeerId,
    role: String,
    coordinator: PeerId,
    commands: Receiver<Envelope<PeerCommand<M>>>,
    results: Sender<Envelope<RolloutResult<E>>>,
}

impl<M, E> PeerEndpoint<M, E> {
    /// Identity of this peer.
    pub fn id(&self) -> &PeerId {
        &self.id
    }

    /// Role label of the group this peer belongs to.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Identity of the coordinator this peer reports to.
    pub fn coordinator(&self) -> &PeerId {
        &self.coordinator
    }

    /// Block until the next command arrives.
    pub fn recv(&self) -> Result<Envelope<PeerCommand<M>>, TransportError> {
        self.commands.recv().map_err(|_| TransportError::Disconnected)
    }

    /// Next command if one is already queued.
    pub fn try_recv(&self) -> Result<Option<Envelope<PeerCommand<M>>>, TransportError> {
        match self.commands.try_recv() {
            Ok(env) => Ok(Some(env)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TransportError::Disconnected),
        }
    }

    /// Send a result to the coordinator.
    pub fn send_result(&self, result: RolloutResult<E>) -> Result<(), TransportError> {
        let env = Envelope::new(
            self.id.clone(),
            MsgTag::RolloutResult,
            SessionKind::Task,
            result,
        );
        self.results.send(env).map_err(|_| TransportError::Disconnected)
    }
}

/// Builder for an in-process coordinator and its peer endpoints.
#[derive(Debug, Clone)]
pub struct ChannelTransportBuilder {
    node: PeerId,
    groups: Vec<(String, usize)>,
}

impl ChannelTransportBuilder {
    /// Start a builder for the coordinator node `node`.
    pub fn new(node: impl Into<PeerId>) -> Self {
        Self {
            node: node.into(),
            groups: Vec::new(),
        }
    }

    /// Register a group of `n_peers` peers under `role`.
    ///
    /// Peers are named `{role}.{i}`.
    pub fn with_group(mut self, role: impl Into<String>, n_peers: usize) -> Self {
        self.groups.push((role.into(), n_peers));
        self
    }

    /// Create the channels.
    ///
    /// Endpoints are returned in registration order, peers of one group
    /// numbered from 0.
    pub fn build<M, E>(self) -> (ChannelTransport<M, E>, Vec<PeerEndpoint<M, E>>) {
        let (result_tx, inbox) = unbounded();
        let mut groups: HashMap<String, Vec<PeerLink<M>>> = HashMap::new();
        let mut endpoints = Vec::new();

        for (role, n_peers) in self.groups {
            let links = groups.entry(role.clone()).or_default();
            let offset = links.len();
            for i in offset..offset + n_peers {
                let id = PeerId::new(format!("{}.{}", role, i));
                let (tx, commands) = unbounded();
                links.push(PeerLink { id: id.clone(), tx });
                endpoints.push(PeerEndpoint {
                    id,
                    role: role.clone(),
                    coordinator: self.node.clone(),
                    commands,
                    results: result_tx.clone(),
                });
            }
        }

        let transport = ChannelTransport {
            node: self.node,
            groups,
            inbox,
        };
        (transport, endpoints)
    }
}

impl<M, E> ChannelTransport<M, E> {
    /// Results queued in the inbox and not yet received.
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }
}

impl<M: Clone, E> Transport<M, E> for ChannelTransport<M, E> {
    fn node(&self) -> &PeerId {
        &self.node
    }

    fn peers(&self, role: &str) -> Result<Vec<PeerId>, TransportError> {
        self.groups
            .get(role)
            .map(|links| links.iter().map(|l| l.id.clone()).collect())
            .ok_or_else(|| TransportError::UnknownGroup(role.to_string()))
    }

    fn broadcast(&self, role: &str, command: PeerCommand<M>) -> Result<(), TransportError> {
        let links = self
            .groups
            .get(role)
            .ok_or_else(|| TransportError::UnknownGroup(role.to_string()))?;

        let tag = command.tag();
        let session = command.session();
        for link in links {
            let env = Envelope::new(self.node.clone(), tag, session, command.clone());
            if link.tx.send(env).is_err() {
                log::warn!("Peer {} is gone, dropped {} message", link.id, tag);
            }
        }
        Ok(())
    }

    fn receive(&self) -> Result<Envelope<RolloutResult<E>>, TransportError> {
        self.inbox.recv().map_err(|_| TransportError::Disconnected)
    }
}
