use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::{BOARD_SIZE, Board, NUM_SQUARES};
use crate::error::{GameError, ParseError};

const PASS_TOKEN: &str = "PASS";

/// Stone color. Serialized as `"B"` / `"W"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "W")]
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    /// Single-letter form used in the board string.
    pub fn symbol(self) -> char {
        match self {
            Self::Black => 'B',
            Self::White => 'W',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => f.write_str("Black"),
            Self::White => f.write_str("White"),
        }
    }
}

/// A board coordinate. Text form is column letter + row digit, e.g. `D3`.
///
/// Fields are private so every `Position` is on the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Result<Self, ParseError> {
        if row >= BOARD_SIZE as u8 || col >= BOARD_SIZE as u8 {
            return Err(ParseError::OutOfRange { row, col });
        }
        Ok(Self { row, col })
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        (idx < NUM_SQUARES).then(|| Self {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        })
    }

    /// Zero-based row, `0` is rank 1.
    pub fn row(self) -> u8 {
        self.row
    }

    /// Zero-based column, `0` is file A.
    pub fn col(self) -> u8 {
        self.col
    }

    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    /// Parses `A1`..`H8`. Lowercase letters are accepted only when
    /// `case_insensitive` is set.
    pub fn parse(text: &str, case_insensitive: bool) -> Result<Self, ParseError> {
        let malformed = || ParseError::Coordinate(text.to_string());
        let mut chars = text.trim().chars();
        let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(malformed());
        };

        let letter = if case_insensitive {
            letter.to_ascii_uppercase()
        } else {
            letter
        };
        if !('A'..='H').contains(&letter) || !('1'..='8').contains(&digit) {
            return Err(malformed());
        }

        Self::new(digit as u8 - b'1', letter as u8 - b'A')
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col) as char, self.row + 1)
    }
}

impl FromStr for Position {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, false)
    }
}

impl From<Position> for String {
    fn from(pos: Position) -> Self {
        pos.to_string()
    }
}

impl TryFrom<String> for Position {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A submitted move: a placement or the literal `PASS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Place(Position),
    Pass,
}

impl Move {
    pub fn parse(text: &str, case_insensitive: bool) -> Result<Self, ParseError> {
        let trimmed = text.trim();
        let is_pass = if case_insensitive {
            trimmed.eq_ignore_ascii_case(PASS_TOKEN)
        } else {
            trimmed == PASS_TOKEN
        };
        if is_pass {
            return Ok(Self::Pass);
        }
        Position::parse(trimmed, case_insensitive).map(Self::Place)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place(pos) => pos.fmt(f),
            Self::Pass => f.write_str(PASS_TOKEN),
        }
    }
}

impl FromStr for Move {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, false)
    }
}

/// Snapshot of a game exchanged with the tool layer.
///
/// Field names on the wire follow the tool layer's existing contract:
/// `board`, `to`, `legal`, `black`, `white`, `seq`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportState {
    pub board: Board,
    #[serde(rename = "to")]
    pub side_to_move: Color,
    /// Contract: exactly the legal placements for `side_to_move`, ascending
    /// index order. Empty means the side must pass.
    #[serde(rename = "legal")]
    pub legal_moves: Vec<Position>,
    #[serde(rename = "black")]
    pub black_count: u8,
    #[serde(rename = "white")]
    pub white_count: u8,
    #[serde(rename = "seq", default)]
    pub sequence: u64,
}

impl ExportState {
    pub fn empty_count(&self) -> u8 {
        self.board.empty_count()
    }

    /// Legal moves in their canonical text form.
    pub fn legal_move_names(&self) -> Vec<String> {
        self.legal_moves.iter().map(Position::to_string).collect()
    }
}

/// Final score of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// `None` on a draw.
    pub winner: Option<Color>,
    pub black: u8,
    pub white: u8,
}

impl GameOutcome {
    pub fn from_board(board: &Board) -> Self {
        let (black, white) = board.count();
        let winner = match black.cmp(&white) {
            std::cmp::Ordering::Greater => Some(Color::Black),
            std::cmp::Ordering::Less => Some(Color::White),
            std::cmp::Ordering::Equal => None,
        };
        Self {
            winner,
            black,
            white,
        }
    }
}

/// Result descriptor of a controller call.
///
/// Contract:
/// - `ok == false`: `error` and `code` are set, every other field is absent.
/// - `ok == true` after a move: exactly one of placement (`placed_idx` +
///   `flips`), `pass` or `reset` is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placed_idx: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flips: Option<Vec<u8>>,
    /// The opponent had no reply, so the mover keeps the turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_pass: Option<bool>,
    /// A finished position was left standing (report policy).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<GameOutcome>,
}

impl PlayResult {
    /// Accepted call with no transition flags (new game, restore).
    pub fn accepted() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn rejected(err: &GameError) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
            code: Some(err.code().to_string()),
            ..Self::default()
        }
    }
}
