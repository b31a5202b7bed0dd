//! Player strategies and the static registry shared by coordinator and host.
//!
//! A strategy only ever sees a shot-view board: `Unknown` for squares it has
//! not fired at yet, `Water` for misses and `HitShip` for hits.

use alloc::boxed::Box;
use rand::rngs::SmallRng;

use crate::board::{Board, SquareContent};
use crate::common::PlayerError;
use crate::index::BoardIndex;

pub mod hunter;
pub mod random;
pub mod sequential;

pub use hunter::Hunter;
pub use random::RandomShots;
pub use sequential::Sequential;

/// Interface implemented by shooting strategies.
pub trait Player: Send {
    /// Choose the next square to fire at given what has been observed so far.
    fn choose_shot(&mut self, rng: &mut SmallRng, shots: &Board) -> Result<BoardIndex, PlayerError>;

    /// Inform the player of the content revealed by its last shot.
    fn handle_shot_result(&mut self, _location: BoardIndex, _content: SquareContent) {}
}

/// Registry entry: a name and a constructor for fresh instances.
#[derive(Clone, Copy)]
pub struct PlayerInfo {
    pub name: &'static str,
    pub create: fn() -> Box<dyn Player>,
}

impl core::fmt::Debug for PlayerInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlayerInfo").field("name", &self.name).finish()
    }
}

fn create_sequential() -> Box<dyn Player> {
    Box::new(Sequential)
}

fn create_random_shots() -> Box<dyn Player> {
    Box::new(RandomShots)
}

fn create_hunter() -> Box<dyn Player> {
    Box::new(Hunter::new())
}

/// Strategies known to every process; match players are addressed by their
/// position in this list.
pub static PLAYERS: [PlayerInfo; 3] = [
    PlayerInfo {
        name: "sequential",
        create: create_sequential,
    },
    PlayerInfo {
        name: "random",
        create: create_random_shots,
    },
    PlayerInfo {
        name: "hunter",
        create: create_hunter,
    },
];

/// Read-only view of a player list.
#[derive(Debug, Clone, Copy)]
pub struct PlayerRegistry {
    players: &'static [PlayerInfo],
}

impl PlayerRegistry {
    pub const fn new(players: &'static [PlayerInfo]) -> Self {
        Self { players }
    }

    /// Registry over [`PLAYERS`].
    pub fn builtin() -> Self {
        Self::new(&PLAYERS)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'static PlayerInfo> {
        self.players.get(index)
    }

    /// Position of the player called `name`.
    pub fn position(&self, name: &str) -> Result<usize, PlayerError> {
        self.players
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| PlayerError::UnknownPlayer(name.into()))
    }

    /// Fresh instance of the player at `index`.
    pub fn create(&self, index: usize) -> Option<Box<dyn Player>> {
        self.get(index).map(|info| (info.create)())
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static PlayerInfo> {
        self.players.iter()
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
