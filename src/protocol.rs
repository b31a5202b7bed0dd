//! Messages exchanged between the coordinator and a battle host.

use core::fmt;
use std::string::String;
use std::vec::Vec;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use crate::config::PROTOCOL_VERSION;

/// Opaque token identifying one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub u128);

impl GameId {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Frames carried by a [`Transport`](crate::transport::Transport).
///
/// `seq` numbers shot requests per connection; a `Shot` or `ShotResult`
/// echoes the `seq` of the request it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// First frame from a host.
    Handshake { version: u32 },
    /// Coordinator accepted the host.
    HandshakeAck { version: u32 },
    /// Coordinator refused the host; the link is closed afterwards.
    Rejected { reason: String },
    /// Coordinator asks the host for the next shot of `shooter`.
    RequestShot {
        seq: u64,
        shooter: u32,
        opponent: u32,
        game_id: GameId,
        /// Shooter's view of the opponent board, one content code per square.
        board: Vec<u8>,
    },
    /// Host answers a `RequestShot` with a location such as `"B7"`.
    Shot {
        seq: u64,
        game_id: GameId,
        location: String,
    },
    /// Coordinator reports what the shot revealed.
    ShotResult {
        seq: u64,
        game_id: GameId,
        square_content: u8,
    },
    /// Host's player failed irrecoverably answering request `seq`.
    Crash {
        seq: u64,
        game_id: GameId,
        reason: String,
    },
}

impl Message {
    /// Short name of the payload kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Handshake { .. } => "Handshake",
            Message::HandshakeAck { .. } => "HandshakeAck",
            Message::Rejected { .. } => "Rejected",
            Message::RequestShot { .. } => "RequestShot",
            Message::Shot { .. } => "Shot",
            Message::ShotResult { .. } => "ShotResult",
            Message::Crash { .. } => "Crash",
        }
    }
}
