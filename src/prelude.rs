//! Commonly used types for ease of import.

pub use crate::{Board, BoardIndex, Player, PlayerRegistry, SquareContent};

#[cfg(feature = "std")]
pub use crate::{run_local_match, BattleHost, BattleOutcome, Coordinator, GameId, Shutdown};

#[cfg(feature = "std")]
pub use crate::transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
