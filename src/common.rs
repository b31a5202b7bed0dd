//! Error types shared by the board model, placement and strategies.

use alloc::string::String;

/// Validation errors: a caller handed in coordinates, locations or values that
/// are not legal on a 10x10 board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Raw board index outside `0..100`.
    #[error("board index {0} is out of range (must be between 0 and 99)")]
    IndexOutOfRange(i64),
    /// Column outside `0..10` (or `A..J`).
    #[error("column {0} is out of range (must be between A and J)")]
    ColumnOutOfRange(i64),
    /// Row outside `0..10` (or `1..10`).
    #[error("row {0} is out of range (must be between 1 and 10)")]
    RowOutOfRange(i64),
    /// Location string is not `<column><row>` with column `A..J` and row `1..10`.
    #[error("location {0:?} has to be in the format <column><row> where column is A..J and row is 1..10")]
    InvalidLocation(String),
    #[error("already on last column")]
    LastColumn,
    #[error("already on last row")]
    LastRow,
    /// `Unknown` marks unobserved squares and cannot be written.
    #[error("unknown is not an assignable square content")]
    UnknownNotAssignable,
    #[error("ship length {0} is invalid (must be between 1 and 10)")]
    InvalidShipLength(usize),
    #[error("direction code {0} is invalid")]
    InvalidDirection(u8),
    #[error("square content code {0} is invalid")]
    InvalidContentCode(u8),
    /// Serialized board does not hold exactly one byte per square.
    #[error("serialized board has {0} bytes (expected 100)")]
    InvalidBoardLength(usize),
}

/// Errors raised while filling a board with a fleet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FillError {
    /// No legal spot was found for a ship within the retry budget.
    #[error("board too occupied: no place found for ship of length {ship_length} after {attempts} attempts")]
    BoardTooOccupied { ship_length: usize, attempts: usize },
    #[error(transparent)]
    Invalid(#[from] BoardError),
}

impl FillError {
    /// `true` for the probabilistic capacity failure, `false` for caller mistakes.
    pub fn is_capacity(&self) -> bool {
        matches!(self, FillError::BoardTooOccupied { .. })
    }
}

/// Errors raised by a player strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    #[error("no unknown square left to shoot at")]
    NoUnknownSquare,
    #[error("player {0:?} is not registered")]
    UnknownPlayer(String),
}
