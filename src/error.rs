//! Error types for the arbiter.
//!
//! Every rejected call is reported as a [`GameError`] value and leaves the
//! session untouched, so callers can always retry with corrected input.

use thiserror::Error;

use crate::types::Color;

/// Failures while reading the text forms of coordinates, moves and boards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed move {0:?}: expected A1..H8 or PASS")]
    Coordinate(String),

    #[error("row/col out of range: ({row}, {col})")]
    OutOfRange { row: u8, col: u8 },

    #[error("board must have {expected} cells, got {got}")]
    BoardLength { expected: usize, got: usize },

    #[error("invalid board cell {ch:?} at index {index}")]
    BoardCell { index: usize, ch: char },
}

/// Errors returned by the rule engine, the controller and the host layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The coordinate is not a legal placement, the text is not a move,
    /// or PASS was submitted while a legal move exists.
    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: String, reason: String },

    /// A move was submitted for the color that is not on turn.
    #[error("wrong turn: {got} tried to move but it is {expected}'s turn")]
    WrongTurn { expected: Color, got: Color },

    /// The caller's sequence number does not match the session.
    #[error("stale state: claimed sequence {got}, current sequence is {expected}")]
    StaleState { expected: u64, got: u64 },

    /// The caller's game session token does not match the stored one.
    #[error("game session mismatch")]
    SessionMismatch,

    /// A restored snapshot contradicts its own board.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// No session is stored under the given id.
    #[error("unknown session: {0}")]
    UnknownSession(String),
}

impl GameError {
    /// Creates an IllegalMove error.
    pub fn illegal_move(mv: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IllegalMove {
            mv: mv.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }

    /// Stable machine-readable code, part of the result contract.
    pub fn code(&self) -> &'static str {
        match self {
            Self::IllegalMove { .. } => "ILLEGAL_MOVE",
            Self::WrongTurn { .. } => "WRONG_TURN",
            Self::StaleState { .. } => "STALE_STATE",
            Self::SessionMismatch => "SESSION_MISMATCH",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::UnknownSession(_) => "UNKNOWN_SESSION",
        }
    }
}

/// Errors while loading a [`ControllerConfig`](crate::config::ControllerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid controller config: {0}")]
    Json(#[from] serde_json::Error),
}
