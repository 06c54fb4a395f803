//! Rule engine: pure functions over board values.
//!
//! Nothing here keeps state between calls; every function reads its
//! arguments and returns new values, so it can be called from any thread.

use tracing::instrument;

use crate::board::{Board, mask_to_indices};
use crate::error::GameError;
use crate::types::{Color, ExportState, Position};

/// A placement applied to a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub board: Board,
    /// Flipped square indices, ascending. The placed square is not included.
    pub flips: Vec<u8>,
}

/// Canonical starting snapshot: black to move, sequence 0.
pub fn init() -> ExportState {
    snapshot(Board::new(), Color::Black, 0)
}

/// Builds a snapshot, deriving legal moves and stone counts from `board`.
pub fn snapshot(board: Board, side_to_move: Color, sequence: u64) -> ExportState {
    let (black_count, white_count) = board.count();
    ExportState {
        board,
        side_to_move,
        legal_moves: legal_moves(&board, side_to_move),
        black_count,
        white_count,
        sequence,
    }
}

/// Legal placements for `color`, ascending index order.
pub fn legal_moves(board: &Board, color: Color) -> Vec<Position> {
    mask_to_indices(board.legal_moves(color))
        .into_iter()
        .filter_map(|idx| Position::from_index(idx as usize))
        .collect()
}

/// Places `color` on `pos` and flips every captured stone.
#[instrument(level = "trace", skip_all, fields(%color, %pos))]
pub fn apply_move(board: &Board, color: Color, pos: Position) -> Result<Placement, GameError> {
    let (board, flips) = board
        .place(pos.index(), color)
        .ok_or_else(|| illegal_reason(board, pos))?;

    Ok(Placement {
        board,
        flips: mask_to_indices(flips),
    })
}

/// True when neither color has a legal move.
pub fn is_terminal(board: &Board) -> bool {
    !board.has_legal_move(Color::Black) && !board.has_legal_move(Color::White)
}

/// Checks a snapshot received from outside against its own board.
pub fn validate(state: &ExportState) -> Result<(), GameError> {
    let (black, white) = state.board.count();
    if (state.black_count, state.white_count) != (black, white) {
        return Err(GameError::invalid_state(format!(
            "stone counts {}/{} do not match board {black}/{white}",
            state.black_count, state.white_count
        )));
    }

    let mut claimed = state.legal_moves.clone();
    claimed.sort_unstable();
    if let Some(pair) = claimed.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(GameError::invalid_state(format!(
            "legal move {} is listed twice",
            pair[0]
        )));
    }
    let actual = legal_moves(&state.board, state.side_to_move);
    if claimed != actual {
        return Err(GameError::invalid_state(format!(
            "legal moves for {} should be [{}]",
            state.side_to_move,
            join(&actual)
        )));
    }

    Ok(())
}

fn illegal_reason(board: &Board, pos: Position) -> GameError {
    match board.get(pos) {
        Some(owner) => {
            GameError::illegal_move(pos.to_string(), format!("square is occupied by {owner}"))
        }
        None => GameError::illegal_move(pos.to_string(), "placement captures no stones"),
    }
}

fn join(moves: &[Position]) -> String {
    moves
        .iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
