use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::{Color, Position};

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const EMPTY_CHAR: char = '.';

/// For every square, the squares met when walking outward in each direction,
/// nearest first.
static RAYS: Lazy<[[Vec<u8>; 8]; NUM_SQUARES]> = Lazy::new(|| {
    std::array::from_fn(|pos| {
        let (row, col) = pos_to_row_col(pos);
        DIRECTIONS.map(|(dr, dc)| {
            let mut ray = Vec::new();
            let mut r = row + dr;
            let mut c = col + dc;
            while in_bounds(r, c) {
                ray.push((r as usize * BOARD_SIZE + c as usize) as u8);
                r += dr;
                c += dc;
            }
            ray
        })
    })
});

/// Reversi board state represented by two bitboards.
///
/// A `Board` is an immutable value: [`Board::place`] returns a new board and
/// never touches the receiver, so snapshots holding a board stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Board {
    black: u64,
    white: u64,
}

impl Board {
    /// Creates the initial board:
    /// d4=white, e4=black, d5=black, e5=white.
    pub fn new() -> Self {
        Self {
            black: bit(28) | bit(35),
            white: bit(27) | bit(36),
        }
    }

    /// Builds a board from raw bitboards. A square set in both masks is black.
    pub fn from_bitboards(black: u64, white: u64) -> Self {
        Self {
            black,
            white: white & !black,
        }
    }

    /// Returns the stone on `pos`, if any.
    pub fn get(&self, pos: Position) -> Option<Color> {
        self.cell(pos.index())
    }

    /// Returns the stone on square index `idx` (0..=63), if any.
    pub fn cell(&self, idx: usize) -> Option<Color> {
        let square = bit(idx);
        if (self.black & square) != 0 {
            Some(Color::Black)
        } else if (self.white & square) != 0 {
            Some(Color::White)
        } else {
            None
        }
    }

    /// Returns legal move mask for the given side.
    pub fn legal_moves(&self, color: Color) -> u64 {
        let (me, opp) = self.sides(color);
        let occupied = me | opp;
        let mut legal = 0u64;

        for pos in 0..NUM_SQUARES {
            let move_bit = bit(pos);
            if (occupied & move_bit) != 0 {
                continue;
            }
            if Self::collect_flips(pos, me, opp) != 0 {
                legal |= move_bit;
            }
        }

        legal
    }

    /// Like `legal_moves(color) != 0`, but stops at the first hit.
    pub fn has_legal_move(&self, color: Color) -> bool {
        let (me, opp) = self.sides(color);
        let occupied = me | opp;
        (0..NUM_SQUARES)
            .any(|pos| (occupied & bit(pos)) == 0 && Self::collect_flips(pos, me, opp) != 0)
    }

    /// Places one stone and flips captured stones.
    /// Returns the resulting board and the flipped bit mask, or `None` when
    /// the move captures nothing.
    pub fn place(&self, pos: usize, color: Color) -> Option<(Board, u64)> {
        let (me, opp) = self.sides(color);

        let flips = Self::collect_flips(pos, me, opp);
        if flips == 0 {
            return None;
        }

        let next_me = me | bit(pos) | flips;
        let next_opp = opp & !flips;

        let next = match color {
            Color::Black => Self {
                black: next_me,
                white: next_opp,
            },
            Color::White => Self {
                black: next_opp,
                white: next_me,
            },
        };
        Some((next, flips))
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u8, u8) {
        (self.black.count_ones() as u8, self.white.count_ones() as u8)
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        let (black_count, white_count) = self.count();
        NUM_SQUARES as u8 - black_count - white_count
    }

    fn sides(&self, color: Color) -> (u64, u64) {
        match color {
            Color::Black => (self.black, self.white),
            Color::White => (self.white, self.black),
        }
    }

    fn collect_flips(pos: usize, me: u64, opp: u64) -> u64 {
        if pos >= NUM_SQUARES {
            return 0;
        }

        if ((me | opp) & bit(pos)) != 0 {
            return 0;
        }

        let mut flips = 0u64;

        for ray in &RAYS[pos] {
            let mut line = 0u64;
            for &square in ray {
                let square = bit(square as usize);
                if (opp & square) != 0 {
                    line |= square;
                } else {
                    if (me & square) != 0 {
                        flips |= line;
                    }
                    break;
                }
            }
        }

        flips
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// 64 characters, row-major from A1: `.` empty, `B` black, `W` white.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for idx in 0..NUM_SQUARES {
            let ch = self.cell(idx).map_or(EMPTY_CHAR, Color::symbol);
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != NUM_SQUARES {
            return Err(ParseError::BoardLength {
                expected: NUM_SQUARES,
                got: len,
            });
        }

        let mut black = 0u64;
        let mut white = 0u64;
        for (idx, ch) in s.chars().enumerate() {
            match ch {
                EMPTY_CHAR => {}
                'B' => black |= bit(idx),
                'W' => white |= bit(idx),
                other => return Err(ParseError::BoardCell { index: idx, ch: other }),
            }
        }
        Ok(Self { black, white })
    }
}

impl From<Board> for String {
    fn from(board: Board) -> Self {
        board.to_string()
    }
}

impl TryFrom<String> for Board {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Expands a bit mask into ascending square indices.
pub fn mask_to_indices(mask: u64) -> Vec<u8> {
    let mut bits = mask;
    let mut out = Vec::with_capacity(bits.count_ones() as usize);

    while bits != 0 {
        out.push(bits.trailing_zeros() as u8);
        bits &= bits - 1;
    }

    out
}

fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}

fn pos_to_row_col(pos: usize) -> (i32, i32) {
    ((pos / BOARD_SIZE) as i32, (pos % BOARD_SIZE) as i32)
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
