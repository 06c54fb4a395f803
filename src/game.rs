use tracing::{debug, info, instrument, warn};

use crate::board::Board;
use crate::config::{ControllerConfig, TerminalPolicy};
use crate::error::GameError;
use crate::rules;
use crate::session::{Session, SessionId};
use crate::types::{Color, ExportState, GameOutcome, Move, PlayResult, Position};

/// What an accepted call did to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Placed {
        at: Position,
        flips: Vec<u8>,
        /// The opponent has no reply; the mover keeps the turn.
        auto_pass: bool,
        /// Set under [`TerminalPolicy::Report`] when the placement ended the game.
        game_over: Option<GameOutcome>,
    },
    Passed,
    /// Neither side could move; the game restarted from the opening.
    Reset { final_score: GameOutcome },
}

/// A computed transition: the next snapshot plus what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub snapshot: ExportState,
    pub outcome: Outcome,
}

impl From<Result<Outcome, GameError>> for PlayResult {
    fn from(result: Result<Outcome, GameError>) -> Self {
        match result {
            Err(err) => PlayResult::rejected(&err),
            Ok(Outcome::Placed {
                at,
                flips,
                auto_pass,
                game_over,
            }) => PlayResult {
                placed_idx: Some(at.index() as u8),
                flips: Some(flips),
                auto_pass: auto_pass.then_some(true),
                game_over: game_over.map(|_| true),
                final_score: game_over,
                ..PlayResult::accepted()
            },
            Ok(Outcome::Passed) => PlayResult {
                pass: Some(true),
                ..PlayResult::accepted()
            },
            Ok(Outcome::Reset { final_score }) => PlayResult {
                reset: Some(true),
                final_score: Some(final_score),
                ..PlayResult::accepted()
            },
        }
    }
}

/// Turn and session controller.
///
/// Holds only configuration; the game itself lives in the [`Session`] the
/// caller passes in.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    config: ControllerConfig,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Starts a new game under a fresh session id.
    #[instrument(skip(self))]
    pub fn new_session(&self) -> Session {
        let session = Session::new(SessionId::new());
        info!(session_id = %session.id(), "new game");
        session
    }

    /// Abandons the game in `session` and starts over from the opening. The
    /// session keeps its id and token; the sequence keeps counting.
    #[instrument(
        skip(self, session),
        fields(session_id = %session.id(), sequence = session.sequence())
    )]
    pub fn restart(&self, session: &mut Session) -> PlayResult {
        let mut snapshot = rules::init();
        snapshot.sequence = session.sequence() + 1;
        session.replace(snapshot);
        info!(next = session.sequence(), "game restarted");
        PlayResult {
            reset: Some(true),
            ..PlayResult::accepted()
        }
    }

    pub fn play_black(
        &self,
        session: &mut Session,
        claimed_sequence: Option<u64>,
        mv: &str,
    ) -> PlayResult {
        self.play(session, Color::Black, claimed_sequence, mv)
    }

    pub fn play_white(
        &self,
        session: &mut Session,
        claimed_sequence: Option<u64>,
        mv: &str,
    ) -> PlayResult {
        self.play(session, Color::White, claimed_sequence, mv)
    }

    /// Submits `mv` for `color` and replaces the session snapshot if accepted.
    /// A rejected call leaves the session exactly as it was.
    #[instrument(
        skip(self, session),
        fields(session_id = %session.id(), sequence = session.sequence())
    )]
    pub fn play(
        &self,
        session: &mut Session,
        color: Color,
        claimed_sequence: Option<u64>,
        mv: &str,
    ) -> PlayResult {
        let result = self
            .step(session.snapshot(), color, claimed_sequence, mv)
            .map(|step| {
                session.replace(step.snapshot);
                step.outcome
            });

        match &result {
            Ok(Outcome::Reset { final_score }) => {
                info!(?final_score, "game finished, restarted from the opening")
            }
            Ok(outcome) => debug!(?outcome, next = session.sequence(), "move accepted"),
            Err(err) => warn!(code = err.code(), %err, "move rejected"),
        }

        PlayResult::from(result)
    }

    /// Computes the transition for `mv` without touching any session.
    pub fn step(
        &self,
        state: &ExportState,
        color: Color,
        claimed_sequence: Option<u64>,
        mv: &str,
    ) -> Result<Step, GameError> {
        self.check_sequence(state, claimed_sequence)?;
        if color != state.side_to_move {
            return Err(GameError::WrongTurn {
                expected: state.side_to_move,
                got: color,
            });
        }

        let parsed = Move::parse(mv, self.config.case_insensitive_moves)
            .map_err(|err| GameError::illegal_move(mv, err.to_string()))?;
        let next_sequence = state.sequence + 1;

        match parsed {
            Move::Pass => self.pass(&state.board, color, next_sequence),
            Move::Place(pos) => self.place(&state.board, color, pos, next_sequence),
        }
    }

    /// Replaces the session with an externally supplied snapshot after
    /// checking it against its own board. The stored sequence continues from
    /// the session's, whatever the payload claims.
    #[instrument(
        skip(self, session, snapshot),
        fields(session_id = %session.id(), sequence = session.sequence())
    )]
    pub fn restore<'s>(
        &self,
        session: &'s mut Session,
        snapshot: ExportState,
        claimed_sequence: Option<u64>,
    ) -> Result<&'s ExportState, GameError> {
        let checked = self
            .check_sequence(session.snapshot(), claimed_sequence)
            .and_then(|()| rules::validate(&snapshot));
        if let Err(err) = checked {
            warn!(code = err.code(), %err, "restore rejected");
            return Err(err);
        }

        let next_sequence = session.sequence() + 1;
        session.replace(rules::snapshot(
            snapshot.board,
            snapshot.side_to_move,
            next_sequence,
        ));
        info!(next = next_sequence, "game restored");
        Ok(session.snapshot())
    }

    fn check_sequence(
        &self,
        state: &ExportState,
        claimed_sequence: Option<u64>,
    ) -> Result<(), GameError> {
        match claimed_sequence {
            Some(claimed) if self.config.enforce_sequence && claimed != state.sequence => {
                Err(GameError::StaleState {
                    expected: state.sequence,
                    got: claimed,
                })
            }
            _ => Ok(()),
        }
    }

    fn pass(&self, board: &Board, color: Color, next_sequence: u64) -> Result<Step, GameError> {
        if board.has_legal_move(color) {
            return Err(GameError::illegal_move(
                "PASS",
                "cannot pass while a legal move exists",
            ));
        }

        let next = color.opponent();
        if !board.has_legal_move(next) {
            return Ok(reset(board, next_sequence));
        }

        Ok(Step {
            snapshot: rules::snapshot(*board, next, next_sequence),
            outcome: Outcome::Passed,
        })
    }

    fn place(
        &self,
        board: &Board,
        color: Color,
        pos: Position,
        next_sequence: u64,
    ) -> Result<Step, GameError> {
        let placement = rules::apply_move(board, color, pos)?;
        let opponent = color.opponent();

        let (side, auto_pass, game_over) = if placement.board.has_legal_move(opponent) {
            (opponent, false, None)
        } else if placement.board.has_legal_move(color) {
            (color, true, None)
        } else {
            match self.config.terminal_policy {
                TerminalPolicy::AutoReset => return Ok(reset(&placement.board, next_sequence)),
                TerminalPolicy::Report => (
                    opponent,
                    false,
                    Some(GameOutcome::from_board(&placement.board)),
                ),
            }
        };

        Ok(Step {
            snapshot: rules::snapshot(placement.board, side, next_sequence),
            outcome: Outcome::Placed {
                at: pos,
                flips: placement.flips,
                auto_pass,
                game_over,
            },
        })
    }
}

/// Opening position, but the counter keeps counting.
fn reset(finished: &Board, next_sequence: u64) -> Step {
    let mut snapshot = rules::init();
    snapshot.sequence = next_sequence;
    Step {
        snapshot,
        outcome: Outcome::Reset {
            final_score: GameOutcome::from_board(finished),
        },
    }
}
