use proptest::prelude::*;

use reversi_arbiter::board::NUM_SQUARES;
use reversi_arbiter::{
    Board, Color, Controller, ControllerConfig, Position, Session, TerminalPolicy, rules,
};

fn any_board() -> impl Strategy<Value = Board> {
    (any::<u64>(), any::<u64>())
        .prop_map(|(black, white)| Board::from_bitboards(black, white & !black))
}

fn any_color() -> impl Strategy<Value = Color> {
    prop_oneof![Just(Color::Black), Just(Color::White)]
}

/// Plays a game from the opening, picking among legal moves with `choices`.
fn play_out(
    controller: &Controller,
    choices: &[u16],
    mut check: impl FnMut(&Session, &Session),
) {
    let mut session = controller.new_session();
    for &choice in choices {
        let before = session.clone();
        let state = session.snapshot();
        let mv = if state.legal_moves.is_empty() {
            "PASS".to_string()
        } else {
            state.legal_moves[choice as usize % state.legal_moves.len()].to_string()
        };
        let side = state.side_to_move;
        let result = controller.play(&mut session, side, Some(before.sequence()), &mv);
        assert!(result.ok, "{mv} rejected: {:?}", result.error);
        check(&before, &session);
    }
}

proptest! {
    #[test]
    fn stones_are_conserved(choices in prop::collection::vec(any::<u16>(), 0..80)) {
        play_out(&Controller::default(), &choices, |_, after| {
            let state = after.snapshot();
            let stones = state.black_count as usize + state.white_count as usize;
            assert_eq!(stones + state.empty_count() as usize, NUM_SQUARES);
            assert_eq!(rules::validate(state), Ok(()));
        });
    }

    #[test]
    fn every_accepted_call_advances_the_sequence_by_one(
        choices in prop::collection::vec(any::<u16>(), 0..80)
    ) {
        play_out(&Controller::default(), &choices, |before, after| {
            assert_eq!(after.sequence(), before.sequence() + 1);
        });
    }

    #[test]
    fn auto_reset_never_leaves_a_dead_position(
        choices in prop::collection::vec(any::<u16>(), 0..80)
    ) {
        play_out(&Controller::default(), &choices, |_, after| {
            let state = after.snapshot();
            assert!(!rules::is_terminal(&state.board));
            assert!(!state.legal_moves.is_empty());
        });
    }

    #[test]
    fn report_policy_ends_in_a_reset_after_the_forced_pass(
        choices in prop::collection::vec(any::<u16>(), 0..80)
    ) {
        let controller = Controller::new(
            ControllerConfig::default().with_terminal_policy(TerminalPolicy::Report),
        );
        play_out(&controller, &choices, |before, after| {
            if rules::is_terminal(&before.snapshot().board) {
                assert_eq!(after.snapshot().board, Board::new());
            }
        });
    }

    #[test]
    fn rejected_calls_leave_the_session_unchanged(
        choices in prop::collection::vec(any::<u16>(), 0..40),
        probe in 0usize..NUM_SQUARES,
    ) {
        let controller = Controller::default();
        play_out(&controller, &choices, |_, after| {
            let mut session = after.clone();
            let side = session.snapshot().side_to_move;

            let wrong = controller.play(&mut session, side.opponent(), None, "PASS");
            assert_eq!(wrong.code.as_deref(), Some("WRONG_TURN"));

            let stale = controller.play(&mut session, side, Some(after.sequence() + 1), "PASS");
            assert_eq!(stale.code.as_deref(), Some("STALE_STATE"));

            let pos = Position::from_index(probe).unwrap();
            if !session.snapshot().legal_moves.contains(&pos) {
                let illegal = controller.play(&mut session, side, None, &pos.to_string());
                assert_eq!(illegal.code.as_deref(), Some("ILLEGAL_MOVE"));
            }

            assert_eq!(&session, after);
        });
    }

    #[test]
    fn legal_moves_are_exactly_the_capturing_placements(board in any_board(), color in any_color()) {
        let legal = rules::legal_moves(&board, color);

        for idx in 0..NUM_SQUARES {
            let pos = Position::from_index(idx).unwrap();
            match rules::apply_move(&board, color, pos) {
                Ok(placement) => {
                    prop_assert!(legal.contains(&pos));
                    prop_assert!(!placement.flips.is_empty());
                    prop_assert!(!placement.flips.contains(&(idx as u8)));
                    for &flip in &placement.flips {
                        prop_assert_eq!(board.cell(flip as usize), Some(color.opponent()));
                        prop_assert_eq!(placement.board.cell(flip as usize), Some(color));
                    }
                    let (black, white) = placement.board.count();
                    let (b0, w0) = board.count();
                    prop_assert_eq!(black as usize + white as usize, b0 as usize + w0 as usize + 1);
                }
                Err(err) => {
                    prop_assert!(!legal.contains(&pos));
                    prop_assert_eq!(err.code(), "ILLEGAL_MOVE");
                }
            }
        }
    }

    #[test]
    fn flips_are_deterministic(board in any_board(), color in any_color()) {
        for pos in rules::legal_moves(&board, color) {
            let first = rules::apply_move(&board, color, pos);
            let second = rules::apply_move(&board, color, pos);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn pass_is_accepted_only_without_legal_moves(board in any_board(), color in any_color()) {
        let controller = Controller::default();
        let state = rules::snapshot(board, color, 0);
        let must_pass = state.legal_moves.is_empty();

        let step = controller.step(&state, color, Some(0), "PASS");

        prop_assert_eq!(step.is_ok(), must_pass);
        if let Ok(step) = step {
            prop_assert_eq!(step.snapshot.sequence, 1);
            if rules::is_terminal(&board) {
                prop_assert_eq!(step.snapshot.board, Board::new());
            } else {
                prop_assert_eq!(step.snapshot.board, board);
                prop_assert_eq!(step.snapshot.side_to_move, color.opponent());
            }
        }
    }

    #[test]
    fn restore_accepts_whatever_the_engine_exports(board in any_board(), color in any_color()) {
        let controller = Controller::default();
        let mut session = controller.new_session();

        let restored = controller
            .restore(&mut session, rules::snapshot(board, color, 77), Some(0))
            .unwrap();

        prop_assert_eq!(restored.board, board);
        prop_assert_eq!(restored.sequence, 1);
    }
}
