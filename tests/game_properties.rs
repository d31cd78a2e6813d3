//! Property tests over random dice sequences: piece conservation, turn
//! sanity and winner monotonicity hold no matter how a game unfolds.

use proptest::prelude::*;

use ludoroll::game::{
    apply_move, apply_roll, legal_moves, phase, GameState, GameStatus, Player, PlayerColor,
    RollOutcome, TurnPhase,
};

fn fresh_game(player_count: usize) -> GameState {
    let players = (0..player_count)
        .map(|i| Player::new(format!("player{}", i), PlayerColor::ALL[i]))
        .collect();
    GameState::new("game-under-test", players)
}

/// Every player always accounts for exactly four pieces with distinct
/// ids across the yard, the track and the finish column.
fn assert_conserved(state: &GameState) {
    for player in &state.players {
        let (in_yard, on_board, finished) = player.status_counts();
        assert_eq!(in_yard + on_board + finished, 4);
        let mut ids: Vec<u8> = player.pieces.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_games_conserve_pieces(
        player_count in 2usize..=4,
        dice in proptest::collection::vec(1u8..=6, 1..400),
    ) {
        let mut state = fresh_game(player_count);
        let mut winner_seen: Option<String> = None;

        for value in dice {
            if state.status == GameStatus::Finished {
                break;
            }
            match phase(&state) {
                TurnPhase::AwaitingRoll => {
                    let player_idx = state.current_player;
                    match apply_roll(&mut state, value).unwrap() {
                        RollOutcome::Passed { next_player } => {
                            // A pass rotates away from the roller
                            prop_assert!(next_player != player_idx || player_count == 1);
                            prop_assert!(state.dice_value.is_none());
                        }
                        RollOutcome::MustMove { legal } => {
                            prop_assert!(!legal.is_empty());
                        }
                    }
                }
                TurnPhase::AwaitingMove => {
                    let player_idx = state.current_player;
                    let roll = state.dice_value.unwrap();
                    let legal = legal_moves(&state, player_idx, roll);
                    prop_assert!(!legal.is_empty());
                    let (piece_id, _) = legal[0];
                    let outcome = apply_move(&mut state, player_idx, piece_id).unwrap();

                    if let Some(w) = &outcome.winner {
                        // Winner is set exactly once and the game locks
                        prop_assert!(winner_seen.is_none());
                        winner_seen = Some(w.clone());
                        prop_assert_eq!(state.status, GameStatus::Finished);
                    }
                }
            }
            assert_conserved(&state);

            // The arbiter never leaves the turn on a finished player
            if state.status == GameStatus::Playing {
                prop_assert!(!state.current().has_won());
            }
        }

        // A finished game keeps its winner
        if let Some(w) = winner_seen {
            prop_assert_eq!(state.winner.as_ref(), Some(&w));
            prop_assert_eq!(state.status, GameStatus::Finished);
        }
    }

    #[test]
    fn pass_never_mutates_pieces(
        player_count in 2usize..=4,
        value in 1u8..=5,
    ) {
        // Fresh game, everyone in the yard: any non-six roll passes and
        // the board is untouched
        let mut state = fresh_game(player_count);
        let before = state.players.clone();

        let outcome = apply_roll(&mut state, value).unwrap();
        prop_assert!(
            matches!(outcome, RollOutcome::Passed { .. }),
            "expected RollOutcome::Passed, got {:?}",
            outcome
        );
        for (before_player, after_player) in before.iter().zip(&state.players) {
            prop_assert_eq!(&before_player.pieces, &after_player.pieces);
        }
        prop_assert_eq!(state.current_player, 1);
    }
}
