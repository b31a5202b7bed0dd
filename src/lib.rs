#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod board;
mod common;
mod config;
mod filler;
mod index;
mod placement;
pub mod player;
pub mod prelude;

#[cfg(feature = "std")]
pub mod battle;
#[cfg(feature = "std")]
pub mod connection;
#[cfg(feature = "std")]
pub mod coordinator;
#[cfg(feature = "std")]
pub mod host;
#[cfg(feature = "std")]
pub mod lifecycle;
#[cfg(feature = "std")]
pub mod local;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod transport;

pub use board::*;
pub use common::*;
pub use config::*;
pub use filler::*;
pub use index::*;
pub use placement::*;
pub use player::{Hunter, Player, PlayerInfo, PlayerRegistry, RandomShots, Sequential, PLAYERS};

#[cfg(feature = "std")]
pub use battle::{Battle, BattleOutcome, MatchError, ShotSource};
#[cfg(feature = "std")]
pub use connection::{
    ConnectionState, CoordinatorConnection, HostConnection, RunnerLease, RunnerSlot, ShotError, ShotPhase,
    ShotReply,
};
#[cfg(feature = "std")]
pub use coordinator::Coordinator;
#[cfg(feature = "std")]
pub use host::BattleHost;
#[cfg(feature = "std")]
pub use lifecycle::{Shutdown, ShutdownListener};
#[cfg(feature = "std")]
pub use local::{run_local_match, run_local_match_with, seeded_rng};
#[cfg(feature = "std")]
pub use logging::{init_logging, init_logging_with, parse_level, LOG_ENV};
#[cfg(feature = "std")]
pub use protocol::{GameId, Message};
#[cfg(feature = "std")]
pub use transport::in_memory::InMemoryTransport;
#[cfg(feature = "std")]
pub use transport::tcp::TcpTransport;
#[cfg(feature = "std")]
pub use transport::{Listener, MessageSink, MessageStream, Transport};
