//! Correlation of shot requests and their answers over a message stream.
//!
//! Each side of a coordinator/host link owns one connection object. It holds
//! at most one outstanding request at a time and never owns board content;
//! boards are passed in per call.

use std::string::String;
use std::time::Duration;

use crate::common::BoardError;
use crate::index::BoardIndex;
use crate::protocol::GameId;

pub mod coordinator;
pub mod host;
pub mod slot;

pub use coordinator::CoordinatorConnection;
pub use host::HostConnection;
pub use slot::{RunnerLease, RunnerSlot};

/// Whether a stream is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Sub-state of a connected link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotPhase {
    Idle,
    /// A request is outstanding; further requests are refused.
    AwaitingShot,
}

/// Answer to a shot request: the chosen square and the request it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotReply {
    pub seq: u64,
    pub location: BoardIndex,
}

/// Failures of a single shot exchange.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ShotError {
    #[error("no battle host connected")]
    NotConnected,
    #[error("connection already has a stream attached")]
    AlreadyConnected,
    /// Single-flight violation; nothing was sent.
    #[error("a shot request is already outstanding on this connection")]
    ShotInFlight,
    #[error("no shot received within {0:?}")]
    Timeout(Duration),
    /// The stream was torn down or the application is shutting down.
    #[error("shot request cancelled")]
    Cancelled,
    #[error("error while talking to battle host: {0}")]
    Transport(String),
    #[error("illegal shot: {0}")]
    InvalidLocation(#[source] BoardError),
    #[error("player crashed in game {game_id}: {reason}")]
    PlayerCrashed { game_id: GameId, reason: String },
}
