// Probability-based targeting over a shot-view board.
// Uses no_std math (libm) and avoids heap allocations.

use rand::rngs::SmallRng;
use rand::Rng;

use super::Player;
use crate::board::{Board, SquareContent};
use crate::common::PlayerError;
use crate::config::{BOARD_SIDE, FLEET};
use crate::index::BoardIndex;
use crate::placement::Direction;

/// Probability matrix indexed `[row][column]`.
pub type Pdf = [[f64; BOARD_SIDE]; BOARD_SIDE];

/// Placements covering more observed hits receive dramatically more weight so
/// that squares adjacent to confirmed hits stand out.
const HIT_BIAS: f64 = 10.0;

/// Lower temperature biases sampling towards higher probability squares.
const DEFAULT_TEMPERATURE: f64 = 0.5;

/// Compute a probability density over all unknown squares given the shot-view
/// board and the lengths of ships that may still be afloat. Every placement
/// that avoids known water contributes its weight to the unknown squares it
/// covers.
pub fn calc_pdf(shots: &Board, ship_lengths: &[usize]) -> Pdf {
    let mut matrix = [[0.0f64; BOARD_SIDE]; BOARD_SIDE];
    let content = |r: usize, c: usize| shots.get_at((r * BOARD_SIDE + c) as i32).unwrap_or(SquareContent::Water);

    for &len in ship_lengths.iter() {
        if len == 0 || len > BOARD_SIDE {
            continue;
        }

        for direction in [Direction::Horizontal, Direction::Vertical] {
            let (max_row, max_col) = match direction {
                Direction::Vertical => (BOARD_SIDE - len + 1, BOARD_SIDE),
                Direction::Horizontal => (BOARD_SIDE, BOARD_SIDE - len + 1),
            };
            let square = |r: usize, c: usize, k: usize| match direction {
                Direction::Vertical => (r + k, c),
                Direction::Horizontal => (r, c + k),
            };
            for r in 0..max_row {
                for c in 0..max_col {
                    let mut valid = true;
                    let mut n_hits = 0;
                    for k in 0..len {
                        let (rr, cc) = square(r, c, k);
                        match content(rr, cc) {
                            SquareContent::Water => {
                                valid = false;
                                break;
                            }
                            SquareContent::HitShip | SquareContent::Ship => n_hits += 1,
                            SquareContent::Unknown => {}
                        }
                    }
                    if !valid {
                        continue;
                    }

                    let weight = libm::pow(HIT_BIAS, n_hits as f64);
                    for k in 0..len {
                        let (rr, cc) = square(r, c, k);
                        if content(rr, cc) == SquareContent::Unknown {
                            matrix[rr][cc] += weight;
                        }
                    }
                }
            }
        }
    }

    normalize(matrix, shots)
}

fn normalize(mut matrix: Pdf, shots: &Board) -> Pdf {
    let total: f64 = matrix.iter().flatten().sum();
    if total == 0.0 {
        // No placement fits anymore; spread evenly over what is still unknown.
        let unknown = shots.count(SquareContent::Unknown);
        for ix in shots.positions(SquareContent::Unknown) {
            matrix[ix.row()][ix.column()] = 1.0 / unknown as f64;
        }
        return matrix;
    }
    for v in matrix.iter_mut().flatten() {
        *v /= total;
    }
    matrix
}

/// Sample a square from a probability matrix using a temperature parameter.
/// Squares with zero probability are never chosen; `None` if all are zero.
pub fn sample_pdf<R: Rng + ?Sized>(pdf: &Pdf, temperature: f64, rng: &mut R) -> Option<BoardIndex> {
    let mut adjusted = [[0.0f64; BOARD_SIDE]; BOARD_SIDE];
    let mut total = 0.0;
    let mut last_positive = None;
    for r in 0..BOARD_SIDE {
        for c in 0..BOARD_SIDE {
            if pdf[r][c] > 0.0 {
                let v = libm::pow(pdf[r][c], 1.0 / temperature);
                adjusted[r][c] = v;
                total += v;
                last_positive = Some((r, c));
            }
        }
    }
    let (last_r, last_c) = last_positive?;
    if total > 0.0 {
        let threshold: f64 = rng.random_range(0.0..total);
        let mut cumulative = 0.0;
        for r in 0..BOARD_SIDE {
            for c in 0..BOARD_SIDE {
                cumulative += adjusted[r][c];
                if adjusted[r][c] > 0.0 && threshold < cumulative {
                    return BoardIndex::from_col_row(c, r).ok();
                }
            }
        }
    }
    BoardIndex::from_col_row(last_c, last_r).ok()
}

/// Hunt/target player: samples from the placement density of the fleet.
pub struct Hunter {
    temperature: f64,
}

impl Hunter {
    pub fn new() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(temperature: f64) -> Self {
        Self { temperature }
    }
}

impl Default for Hunter {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for Hunter {
    fn choose_shot(&mut self, rng: &mut SmallRng, shots: &Board) -> Result<BoardIndex, PlayerError> {
        let pdf = calc_pdf(shots, &FLEET);
        sample_pdf(&pdf, self.temperature, rng).ok_or(PlayerError::NoUnknownSquare)
    }
}
