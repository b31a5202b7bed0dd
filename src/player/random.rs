use alloc::vec::Vec;
use rand::rngs::SmallRng;
use rand::Rng;

use super::Player;
use crate::board::{Board, SquareContent};
use crate::common::PlayerError;
use crate::index::BoardIndex;

/// Fires at a uniformly chosen square that has not been observed yet.
pub struct RandomShots;

impl Player for RandomShots {
    fn choose_shot(&mut self, rng: &mut SmallRng, shots: &Board) -> Result<BoardIndex, PlayerError> {
        let unknown: Vec<BoardIndex> = shots.positions(SquareContent::Unknown).collect();
        if unknown.is_empty() {
            return Err(PlayerError::NoUnknownSquare);
        }
        Ok(unknown[rng.random_range(0..unknown.len())])
    }
}
