//! Addressing and framing for messages exchanged with a peer group.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a node on the transport (a peer or the coordinator).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    /// Create a peer identity from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the peer.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PeerId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Tag identifying the kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MsgTag {
    /// Coordinator asks peers to run a rollout segment.
    Rollout,
    /// Peer reports the outcome of a rollout segment.
    RolloutResult,
    /// Coordinator tells peers to shut down.
    Exit,
}

impl fmt::Display for MsgTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MsgTag::Rollout => "rollout",
            MsgTag::RolloutResult => "rollout_result",
            MsgTag::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// Session semantics of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    /// The sender expects the receiver to do work and reply.
    Task,
    /// One-way notification, no reply expected.
    Notification,
}

/// A message in flight, stamped with its sender, tag and session kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<B> {
    /// Node that sent the message.
    pub source: PeerId,
    /// Message kind.
    pub tag: MsgTag,
    /// Session semantics.
    pub session: SessionKind,
    /// Message body.
    pub body: B,
}

impl<B> Envelope<B> {
    /// Wrap a body for sending.
    pub fn new(source: PeerId, tag: MsgTag, session: SessionKind, body: B) -> Self {
        Self {
            source,
            tag,
            session,
            body,
        }
    }

    /// Unwrap the body.
    pub fn into_body(self) -> B {
        self.body
    }
}
