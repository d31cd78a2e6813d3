//! Turn and dice arbitration
//!
//! Drives the per-player phase machine (awaiting roll, awaiting move) and
//! the rotation over seated players. A roll of the maximum face with a
//! legal move keeps the turn with the actor, as does finishing a piece;
//! a roll with no legal move passes immediately. Players whose pieces are
//! all finished are removed from the rotation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::{
    compute_next_position, detect_capture, has_reached_home, is_legal_move, legal_moves,
    ENTRY_ROLL,
};
use super::state::{CapturedPiece, GameState, GameStatus, MoveRecord, Position};
use crate::error::{Error, Result};

/// Phase of the active player's turn, derived from the pending dice value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    AwaitingRoll,
    AwaitingMove,
}

/// Current phase for the active player
pub fn phase(state: &GameState) -> TurnPhase {
    if state.dice_value.is_some() {
        TurnPhase::AwaitingMove
    } else {
        TurnPhase::AwaitingRoll
    }
}

/// Outcome of applying a dice roll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RollOutcome {
    /// The roll has at least one legal move; the player must now move
    MustMove { legal: Vec<(u8, Position)> },
    /// No legal move for this value; the turn passed immediately
    Passed { next_player: usize },
}

/// Outcome of applying a move
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub to: Position,
    pub captured: Option<CapturedPiece>,
    pub reached_home: bool,
    /// The actor keeps the turn (rolled the entry face or finished a piece)
    pub extra_turn: bool,
    pub winner: Option<String>,
}

/// Apply a known dice value to the game. Random value generation lives
/// with the room manager; replay and tests drive this directly.
pub fn apply_roll(state: &mut GameState, value: u8) -> Result<RollOutcome> {
    if state.status != GameStatus::Playing {
        return Err(Error::GameNotActive);
    }
    if !(1..=ENTRY_ROLL).contains(&value) {
        return Err(Error::InvalidRoll(format!("die value {} out of range", value)));
    }
    if state.dice_value.is_some() {
        return Err(Error::InvalidRoll(
            "previous roll has not been played yet".to_string(),
        ));
    }

    let legal = legal_moves(state, state.current_player, value);
    if legal.is_empty() {
        debug!(
            game_id = %state.game_id,
            player = state.current_player,
            value,
            "no legal move for roll, passing turn"
        );
        let next_player = advance_turn(state);
        return Ok(RollOutcome::Passed { next_player });
    }

    state.dice_value = Some(value);
    Ok(RollOutcome::MustMove { legal })
}

/// Apply the pending roll to one of the acting player's pieces
pub fn apply_move(state: &mut GameState, player_idx: usize, piece_id: u8) -> Result<MoveOutcome> {
    if state.status != GameStatus::Playing {
        return Err(Error::GameNotActive);
    }
    if player_idx != state.current_player {
        return Err(Error::NotYourTurn);
    }
    let dice_value = state
        .dice_value
        .ok_or_else(|| Error::InvalidMove("no pending roll".to_string()))?;

    let piece = state.players[player_idx]
        .piece(piece_id)
        .ok_or_else(|| Error::InvalidMove(format!("no piece {}", piece_id)))?;
    let from = piece.position;

    let to = compute_next_position(from, dice_value)
        .ok_or_else(|| Error::InvalidMove("piece cannot move with this roll".to_string()))?;
    if !is_legal_move(state, player_idx, piece_id, to) {
        return Err(Error::InvalidMove("destination blocked".to_string()));
    }

    // Capture before mutating so occupancy reflects the pre-move board
    let captured = detect_capture(state, player_idx, to).map(|(victim_idx, victim_piece)| {
        let victim = &mut state.players[victim_idx];
        // Deterministic yard slot: a piece always returns to its own slot
        victim.pieces[victim_piece as usize].position = Position::Yard { slot: victim_piece };
        CapturedPiece {
            user_id: victim.user_id.clone(),
            piece_id: victim_piece,
        }
    });

    state.players[player_idx].pieces[piece_id as usize].position = to;
    state.dice_value = None;

    let reached_home = has_reached_home(to);
    let user_id = state.players[player_idx].user_id.clone();
    state.last_move = Some(MoveRecord {
        user_id: user_id.clone(),
        piece_id,
        dice_value,
        from,
        to,
        captured: captured.clone(),
    });

    // Victory is announced exactly once; the status never leaves Finished
    if state.players[player_idx].has_won() {
        state.status = GameStatus::Finished;
        state.winner = Some(user_id.clone());
        debug!(game_id = %state.game_id, winner = %user_id, "game finished");
        return Ok(MoveOutcome {
            to,
            captured,
            reached_home,
            extra_turn: false,
            winner: Some(user_id),
        });
    }

    let extra_turn = dice_value == ENTRY_ROLL || reached_home;
    if !extra_turn {
        advance_turn(state);
    }

    Ok(MoveOutcome {
        to,
        captured,
        reached_home,
        extra_turn,
        winner: None,
    })
}

/// Advance to the next player in fixed rotation, skipping players whose
/// four pieces have all finished. Returns the new index.
pub fn advance_turn(state: &mut GameState) -> usize {
    let count = state.players.len();
    for step in 1..=count {
        let candidate = (state.current_player + step) % count;
        if !state.players[candidate].has_won() {
            state.current_player = candidate;
            return candidate;
        }
    }
    // Everyone else finished; the rotation stays put
    state.current_player
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Player, PlayerColor};

    fn playing_state(n: usize) -> GameState {
        let names = ["red", "green", "yellow", "blue"];
        let players: Vec<Player> = PlayerColor::ALL
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, color)| Player::new(names[i], *color))
            .collect();
        GameState::new("game-t", players)
    }

    #[test]
    fn test_six_from_yard_keeps_turn() {
        let mut state = playing_state(4);
        let outcome = apply_roll(&mut state, 6).unwrap();
        assert!(matches!(outcome, RollOutcome::MustMove { .. }));

        let result = apply_move(&mut state, 0, 0).unwrap();
        assert_eq!(result.to, Position::Track { offset: 0 });
        assert!(result.extra_turn);
        // Turn stays on red
        assert_eq!(state.current_player, 0);
    }

    #[test]
    fn test_no_legal_move_passes_immediately() {
        let mut state = playing_state(2);
        // All pieces in yard, roll of 3 cannot enter
        let outcome = apply_roll(&mut state, 3).unwrap();
        assert!(matches!(outcome, RollOutcome::Passed { next_player: 1 }));
        assert_eq!(state.current_player, 1);
        assert_eq!(state.dice_value, None);
    }

    #[test]
    fn test_non_six_move_advances_turn() {
        let mut state = playing_state(2);
        state.players[0].pieces[0].position = Position::Track { offset: 4 };
        apply_roll(&mut state, 3).unwrap();
        let result = apply_move(&mut state, 0, 0).unwrap();
        assert!(!result.extra_turn);
        assert_eq!(state.current_player, 1);
    }

    #[test]
    fn test_reaching_home_keeps_turn() {
        let mut state = playing_state(2);
        state.players[0].pieces[0].position = Position::Home { offset: 4 };
        state.players[0].pieces[1].position = Position::Track { offset: 1 };
        apply_roll(&mut state, 2).unwrap();
        let result = apply_move(&mut state, 0, 0).unwrap();
        assert!(result.reached_home);
        assert!(result.extra_turn);
        assert_eq!(state.current_player, 0);
    }

    #[test]
    fn test_move_out_of_turn_rejected() {
        let mut state = playing_state(2);
        state.players[0].pieces[0].position = Position::Track { offset: 4 };
        apply_roll(&mut state, 3).unwrap();
        assert!(matches!(apply_move(&mut state, 1, 0), Err(Error::NotYourTurn)));
    }

    #[test]
    fn test_winner_set_once_and_game_locks() {
        let mut state = playing_state(2);
        for piece_id in 0..3 {
            state.players[0].pieces[piece_id].position = Position::Finished;
        }
        state.players[0].pieces[3].position = Position::Home { offset: 5 };

        apply_roll(&mut state, 1).unwrap();
        let result = apply_move(&mut state, 0, 3).unwrap();
        assert_eq!(result.winner.as_deref(), Some("red"));
        assert_eq!(state.status, GameStatus::Finished);
        assert_eq!(state.winner.as_deref(), Some("red"));

        // No further rolls or moves succeed
        assert!(matches!(apply_roll(&mut state, 6), Err(Error::GameNotActive)));
    }

    #[test]
    fn test_rotation_skips_finished_players() {
        let mut state = playing_state(3);
        // Green (index 1) has finished all pieces
        for piece in state.players[1].pieces.iter_mut() {
            piece.position = Position::Finished;
        }
        state.players[0].pieces[0].position = Position::Track { offset: 4 };
        apply_roll(&mut state, 2).unwrap();
        apply_move(&mut state, 0, 0).unwrap();
        // Rotation skipped green straight to yellow
        assert_eq!(state.current_player, 2);
    }

    #[test]
    fn test_capture_resets_to_deterministic_slot() {
        let mut state = playing_state(2);
        // Red at relative 10, green at relative 10 + 13 offset difference:
        // red relative 15 = absolute 15; green relative 2 = absolute 15
        state.players[0].pieces[0].position = Position::Track { offset: 10 };
        state.players[1].pieces[2].position = Position::Track { offset: 2 };

        apply_roll(&mut state, 5).unwrap();
        let result = apply_move(&mut state, 0, 0).unwrap();
        let captured = result.captured.expect("expected a capture");
        assert_eq!(captured.user_id, "green");
        assert_eq!(captured.piece_id, 2);
        assert_eq!(
            state.players[1].pieces[2].position,
            Position::Yard { slot: 2 }
        );
        // Captured piece count conservation
        assert_eq!(state.players[1].status_counts(), (4, 0, 0));
    }
}
