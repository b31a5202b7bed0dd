//! Ship placement rules.
//!
//! Ships occupy consecutive squares horizontally or vertically, must stay on
//! the board, must not overlap, and must be separated from every other ship
//! by at least one square of water (diagonals included).

use crate::common::BoardError;
use crate::config::BOARD_SIDE;
use crate::index::BoardIndex;

/// Direction a ship extends from its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards higher columns.
    Horizontal,
    /// Towards higher rows.
    Vertical,
}

impl TryFrom<u8> for Direction {
    type Error = BoardError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Direction::Horizontal),
            1 => Ok(Direction::Vertical),
            other => Err(BoardError::InvalidDirection(other)),
        }
    }
}

/// Decide whether a ship of `ship_length` may be placed at `origin`.
///
/// `is_water(col, row)` is queried for every square of the ship's footprint
/// grown by one square on each side that exists on the board. Any square
/// that is not water rejects the placement. Nothing is written.
pub fn can_place_ship<F>(
    origin: BoardIndex,
    ship_length: usize,
    direction: Direction,
    mut is_water: F,
) -> Result<bool, BoardError>
where
    F: FnMut(usize, usize) -> bool,
{
    if ship_length == 0 || ship_length > BOARD_SIDE {
        return Err(BoardError::InvalidShipLength(ship_length));
    }

    let (col, row) = (origin.column(), origin.row());
    let along = match direction {
        Direction::Horizontal => col,
        Direction::Vertical => row,
    };
    if along + ship_length > BOARD_SIDE {
        return Ok(false);
    }

    let (last_col, last_row) = match direction {
        Direction::Horizontal => (col + ship_length - 1, row),
        Direction::Vertical => (col, row + ship_length - 1),
    };
    let first_check_col = col.saturating_sub(1);
    let first_check_row = row.saturating_sub(1);
    let last_check_col = (last_col + 1).min(BOARD_SIDE - 1);
    let last_check_row = (last_row + 1).min(BOARD_SIDE - 1);

    for r in first_check_row..=last_check_row {
        for c in first_check_col..=last_check_col {
            if !is_water(c, r) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
