//! Fleet placement.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::common::{BoardError, FillError};
use crate::config::{BOARD_SIDE, MAX_PLACEMENT_ATTEMPTS};
use crate::index::BoardIndex;
use crate::placement::Direction;

/// A board on which ships can be placed under the placement rules.
pub trait FillableBoard {
    /// Place the ship if the rules allow it. `Ok(false)` means the spot is
    /// taken or off the board; errors are reserved for invalid arguments.
    fn try_place_ship(
        &mut self,
        origin: BoardIndex,
        ship_length: usize,
        direction: Direction,
    ) -> Result<bool, BoardError>;
}

/// Strategy for placing a list of ships onto a board.
pub trait BoardFiller {
    /// Place every ship of `ship_lengths`, in the given order.
    fn fill(&mut self, ship_lengths: &[usize], board: &mut dyn FillableBoard) -> Result<(), FillError>;
}

/// Places ships at random origins and directions, giving up on a ship after
/// [`MAX_PLACEMENT_ATTEMPTS`] rejected attempts.
pub struct RandomBoardFiller<R: Rng = SmallRng> {
    rng: R,
}

impl<R: Rng> RandomBoardFiller<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn place_ship(&mut self, ship_length: usize, board: &mut dyn FillableBoard) -> Result<(), FillError> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let origin = BoardIndex::from_col_row(
                self.rng.random_range(0..BOARD_SIDE),
                self.rng.random_range(0..BOARD_SIDE),
            )?;
            let direction = if self.rng.random_bool(0.5) {
                Direction::Horizontal
            } else {
                Direction::Vertical
            };
            if board.try_place_ship(origin, ship_length, direction)? {
                return Ok(());
            }
        }
        log::debug!(
            "giving up on ship of length {} after {} attempts",
            ship_length,
            MAX_PLACEMENT_ATTEMPTS
        );
        Err(FillError::BoardTooOccupied {
            ship_length,
            attempts: MAX_PLACEMENT_ATTEMPTS,
        })
    }
}

impl RandomBoardFiller<SmallRng> {
    /// Filler with a reproducible placement sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> BoardFiller for RandomBoardFiller<R> {
    fn fill(&mut self, ship_lengths: &[usize], board: &mut dyn FillableBoard) -> Result<(), FillError> {
        for &ship_length in ship_lengths {
            self.place_ship(ship_length, board)?;
        }
        Ok(())
    }
}
