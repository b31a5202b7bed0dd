//! Addressing of single squares on the 10x10 board.

use core::fmt;
use core::str::FromStr;

use crate::common::BoardError;
use crate::config::{BOARD_CELLS, BOARD_SIDE};

/// Index of a square, always in `0..100`.
///
/// Columns are `A..J` (0-based `0..10`), rows are `1..10` (0-based `0..10`);
/// the raw index is `row * 10 + column`. Once constructed an index is valid,
/// so readers and writers taking a `BoardIndex` need no further checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BoardIndex(u8);

impl BoardIndex {
    /// Index from a raw `0..100` value.
    pub fn new(index: usize) -> Result<Self, BoardError> {
        if index < BOARD_CELLS {
            Ok(Self(index as u8))
        } else {
            Err(BoardError::IndexOutOfRange(index as i64))
        }
    }

    /// Index from 0-based column and row.
    pub fn from_col_row(col: usize, row: usize) -> Result<Self, BoardError> {
        if col >= BOARD_SIDE {
            return Err(BoardError::ColumnOutOfRange(col as i64));
        }
        if row >= BOARD_SIDE {
            return Err(BoardError::RowOutOfRange(row as i64));
        }
        Ok(Self((row * BOARD_SIDE + col) as u8))
    }

    /// Index from a column letter `A..J` and a 1-based row `1..10`.
    pub fn from_letter(col: char, row: usize) -> Result<Self, BoardError> {
        if !('A'..='J').contains(&col) {
            return Err(BoardError::ColumnOutOfRange(col as i64 - 'A' as i64));
        }
        if !(1..=BOARD_SIDE).contains(&row) {
            return Err(BoardError::RowOutOfRange(row as i64 - 1));
        }
        Self::from_col_row(col as usize - 'A' as usize, row - 1)
    }

    /// 0-based column.
    pub fn column(self) -> usize {
        self.0 as usize % BOARD_SIDE
    }

    /// 0-based row.
    pub fn row(self) -> usize {
        self.0 as usize / BOARD_SIDE
    }

    /// Raw `0..100` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Column letter `A..J`.
    pub fn column_letter(self) -> char {
        (b'A' + self.column() as u8) as char
    }

    /// Square to the right. Fails on the last column instead of wrapping.
    pub fn next_column(self) -> Result<Self, BoardError> {
        if self.column() < BOARD_SIDE - 1 {
            Ok(Self(self.0 + 1))
        } else {
            Err(BoardError::LastColumn)
        }
    }

    /// Square below. Fails on the last row.
    pub fn next_row(self) -> Result<Self, BoardError> {
        if self.row() < BOARD_SIDE - 1 {
            Ok(Self(self.0 + BOARD_SIDE as u8))
        } else {
            Err(BoardError::LastRow)
        }
    }

    /// Row-major successor (J1 is followed by A2). `None` after J10.
    pub fn next(self) -> Option<Self> {
        Self::new(self.index() + 1).ok()
    }

    /// All 100 squares in row-major order.
    pub fn all() -> impl Iterator<Item = BoardIndex> {
        (0..BOARD_CELLS as u8).map(BoardIndex)
    }
}

impl TryFrom<i32> for BoardIndex {
    type Error = BoardError;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        if index < 0 {
            return Err(BoardError::IndexOutOfRange(index as i64));
        }
        Self::new(index as usize)
    }
}

impl From<BoardIndex> for usize {
    fn from(ix: BoardIndex) -> usize {
        ix.index()
    }
}

impl FromStr for BoardIndex {
    type Err = BoardError;

    /// Parses `A1`..`J10`: one uppercase column letter immediately followed by
    /// the row number without leading zeros.
    fn from_str(location: &str) -> Result<Self, Self::Err> {
        let invalid = || BoardError::InvalidLocation(location.into());
        let bytes = location.as_bytes();
        if !(2..=3).contains(&bytes.len()) {
            return Err(invalid());
        }
        let col = bytes[0];
        if !(b'A'..=b'J').contains(&col) {
            return Err(invalid());
        }
        let digits = &bytes[1..];
        if !digits.iter().all(u8::is_ascii_digit) || digits[0] == b'0' {
            return Err(invalid());
        }
        let row = digits
            .iter()
            .fold(0usize, |acc, d| acc * 10 + (d - b'0') as usize);
        if !(1..=BOARD_SIDE).contains(&row) {
            return Err(invalid());
        }
        Self::from_col_row((col - b'A') as usize, row - 1)
    }
}

impl fmt::Display for BoardIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letter(), self.row() + 1)
    }
}
