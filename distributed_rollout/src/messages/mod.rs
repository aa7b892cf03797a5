//! Messages exchanged between the coordinator and its peer group.
//!
//! # Architecture
//!
//! ```text
//!                  +-------------------+
//!                  |    Coordinator    |
//!                  +-------------------+
//!                     |            ^
//!   PeerCommand::Rollout / Exit    |  RolloutResult
//!          (broadcast)             |  (one per peer per round)
//!                     v            |
//!        +----------+ +----------+ +----------+
//!        | actor.0  | | actor.1  | | actor.N  |
//!        +----------+ +----------+ +----------+
//! ```

mod actor_stats;
mod envelope;
mod rollout_msg;


pub use actor_stats::ActorStats;
pub use envelope::{Envelope, MsgTag, PeerId, SessionKind};
pub use rollout_msg::{ParamMap, PeerCommand, RolloutInstruction, RolloutResult};
