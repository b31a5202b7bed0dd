use rand::rngs::SmallRng;

use super::Player;
use crate::board::{Board, SquareContent};
use crate::common::PlayerError;
use crate::index::BoardIndex;

/// Fires at one square after the other: A1, B1, ... J1, A2, ...
pub struct Sequential;

impl Player for Sequential {
    fn choose_shot(&mut self, _rng: &mut SmallRng, shots: &Board) -> Result<BoardIndex, PlayerError> {
        shots
            .positions(SquareContent::Unknown)
            .next()
            .ok_or(PlayerError::NoUnknownSquare)
    }
}
