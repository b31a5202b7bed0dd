//! Board content: a fixed grid of 100 squares used both as a truth board
//! (ship placement) and as a shot-view board (what a shooter has observed).

use alloc::string::String;
use core::fmt;
use core::ops::Index;

use crate::common::{BoardError, FillError};
use crate::config::{BOARD_CELLS, BOARD_SIDE, FLEET};
use crate::filler::{BoardFiller, FillableBoard};
use crate::index::BoardIndex;
use crate::placement::{can_place_ship, Direction};

/// Content of a single square.
///
/// The discriminants are the wire codes used when a board is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SquareContent {
    #[default]
    Water = 0,
    Ship = 1,
    HitShip = 2,
    /// Not yet observed; only found on shot-view boards.
    Unknown = 3,
}

impl SquareContent {
    /// Wire code of this content.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Two-character cell used by [`Board::render`].
    fn cell(self) -> &'static str {
        match self {
            SquareContent::Water => "~~",
            SquareContent::Ship => "██",
            SquareContent::HitShip => "XX",
            SquareContent::Unknown => "  ",
        }
    }
}

impl TryFrom<u8> for SquareContent {
    type Error = BoardError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SquareContent::Water),
            1 => Ok(SquareContent::Ship),
            2 => Ok(SquareContent::HitShip),
            3 => Ok(SquareContent::Unknown),
            other => Err(BoardError::InvalidContentCode(other)),
        }
    }
}

/// 100 squares addressed by [`BoardIndex`] (row-major).
///
/// Reads take `&self` and may be shared freely; every write goes through
/// `&mut self`, so a board has exactly one writer at a time.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [SquareContent; BOARD_CELLS],
}

impl Board {
    /// An all-water board.
    pub fn new() -> Self {
        Self {
            squares: [SquareContent::Water; BOARD_CELLS],
        }
    }

    /// A shot-view board on which nothing has been observed yet.
    pub fn unknown() -> Self {
        Self {
            squares: [SquareContent::Unknown; BOARD_CELLS],
        }
    }

    /// A truth board: cleared to water, then filled with [`FLEET`].
    pub fn with_fleet<F: BoardFiller + ?Sized>(filler: &mut F) -> Result<Self, FillError> {
        let mut board = Self::new();
        board.initialize(filler)?;
        Ok(board)
    }

    /// Clear to water and place [`FLEET`] using `filler`.
    ///
    /// On failure the board holds whatever ships were already placed and
    /// must not be used as a match board.
    pub fn initialize<F: BoardFiller + ?Sized>(&mut self, filler: &mut F) -> Result<(), FillError> {
        self.clear(SquareContent::Water);
        filler.fill(&FLEET, self)
    }

    /// Set every square to `content` (including `Unknown`).
    pub fn clear(&mut self, content: SquareContent) {
        self.squares = [content; BOARD_CELLS];
    }

    pub fn get(&self, ix: BoardIndex) -> SquareContent {
        self.squares[ix.index()]
    }

    /// Read by raw index, failing outside `0..100`.
    pub fn get_at(&self, index: i32) -> Result<SquareContent, BoardError> {
        Ok(self.get(BoardIndex::try_from(index)?))
    }

    /// Write a square. `Unknown` cannot be assigned.
    pub fn set(&mut self, ix: BoardIndex, content: SquareContent) -> Result<(), BoardError> {
        if content == SquareContent::Unknown {
            return Err(BoardError::UnknownNotAssignable);
        }
        self.squares[ix.index()] = content;
        Ok(())
    }

    /// Write by raw index, failing outside `0..100` or for `Unknown`.
    pub fn set_at(&mut self, index: i32, content: SquareContent) -> Result<(), BoardError> {
        self.set(BoardIndex::try_from(index)?, content)
    }

    /// Squares in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = SquareContent> + '_ {
        self.squares.iter().copied()
    }

    /// Number of squares holding `content`.
    pub fn count(&self, content: SquareContent) -> usize {
        self.iter().filter(|&s| s == content).count()
    }

    /// Indexes of all squares holding `content`.
    pub fn positions(&self, content: SquareContent) -> impl Iterator<Item = BoardIndex> + '_ {
        BoardIndex::all().filter(move |&ix| self.get(ix) == content)
    }

    /// `true` if the square is water (the probe used for ship placement).
    pub fn is_water(&self, col: usize, row: usize) -> bool {
        matches!(
            BoardIndex::from_col_row(col, row).map(|ix| self.get(ix)),
            Ok(SquareContent::Water)
        )
    }

    /// Write a ship of `ship_length` squares starting at `origin`.
    ///
    /// No legality check beyond the board bounds; use
    /// [`FillableBoard::try_place_ship`] for rule-checked placement.
    pub fn place_ship(
        &mut self,
        origin: BoardIndex,
        ship_length: usize,
        direction: Direction,
    ) -> Result<(), BoardError> {
        if ship_length == 0 || ship_length > BOARD_SIDE {
            return Err(BoardError::InvalidShipLength(ship_length));
        }
        // walk the whole footprint first so a ship running off the board
        // leaves no squares behind
        let mut footprint = [origin; BOARD_SIDE];
        for i in 1..ship_length {
            footprint[i] = match direction {
                Direction::Horizontal => footprint[i - 1].next_column()?,
                Direction::Vertical => footprint[i - 1].next_row()?,
            };
        }
        for ix in &footprint[..ship_length] {
            self.squares[ix.index()] = SquareContent::Ship;
        }
        Ok(())
    }

    /// Fire at a square of a truth board and return its new content:
    /// `Ship` turns into `HitShip`, anything else is left as is.
    pub fn shoot_at(&mut self, ix: BoardIndex) -> SquareContent {
        let square = &mut self.squares[ix.index()];
        if *square == SquareContent::Ship {
            *square = SquareContent::HitShip;
        }
        *square
    }

    /// All ships have been hit: at least one `HitShip` and no `Ship` left.
    /// A board without any ships has not lost.
    pub fn has_lost(&self) -> bool {
        !self.iter().any(|s| s == SquareContent::Ship)
            && self.iter().any(|s| s == SquareContent::HitShip)
    }

    /// One content code per square, index = row * 10 + column.
    pub fn to_bytes(&self) -> [u8; BOARD_CELLS] {
        let mut bytes = [0u8; BOARD_CELLS];
        for (byte, square) in bytes.iter_mut().zip(self.squares.iter()) {
            *byte = square.code();
        }
        bytes
    }

    /// Inverse of [`Board::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BoardError> {
        if bytes.len() != BOARD_CELLS {
            return Err(BoardError::InvalidBoardLength(bytes.len()));
        }
        let mut board = Self::new();
        for (square, &code) in board.squares.iter_mut().zip(bytes) {
            *square = SquareContent::try_from(code)?;
        }
        Ok(board)
    }

    /// Box-drawing diagnostic rendering, one two-character cell per column.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let border = |out: &mut String, left: char, mid: char, right: char| {
            out.push(left);
            for col in 0..BOARD_SIDE {
                out.push_str("──");
                out.push(if col == BOARD_SIDE - 1 { right } else { mid });
            }
            out.push('\n');
        };

        border(&mut out, '┌', '┬', '┐');
        for row in 0..BOARD_SIDE {
            out.push('│');
            for col in 0..BOARD_SIDE {
                out.push_str(self.squares[row * BOARD_SIDE + col].cell());
                out.push('│');
            }
            out.push('\n');
            if row != BOARD_SIDE - 1 {
                border(&mut out, '├', '┼', '┤');
            }
        }
        border(&mut out, '└', '┴', '┘');
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<BoardIndex> for Board {
    type Output = SquareContent;

    fn index(&self, ix: BoardIndex) -> &SquareContent {
        &self.squares[ix.index()]
    }
}

impl FillableBoard for Board {
    fn try_place_ship(
        &mut self,
        origin: BoardIndex,
        ship_length: usize,
        direction: Direction,
    ) -> Result<bool, BoardError> {
        if !can_place_ship(origin, ship_length, direction, |c, r| self.is_water(c, r))? {
            return Ok(false);
        }
        self.place_ship(origin, ship_length, direction)?;
        Ok(true)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Board {{ ships: {}, hits: {}, water: {}, unknown: {} }}",
            self.count(SquareContent::Ship),
            self.count(SquareContent::HitShip),
            self.count(SquareContent::Water),
            self.count(SquareContent::Unknown)
        )
    }
}
