//! Move rules engine
//!
//! Pure functions over [`GameState`]: candidate position computation,
//! legality, capture detection and victory. No I/O and no randomness;
//! the turn arbiter and room manager drive these.
//!
//! Movement semantics:
//! - A yard piece enters the track at its color's start cell only on a
//!   roll of the maximum die face.
//! - A track piece past offset 50 turns into its home stretch; the excess
//!   over 50 becomes the home offset. Overshooting the home stretch is
//!   illegal, never a wrap into another color's home.
//! - A home piece advancing exactly to offset 6 finishes.

use super::board::{absolute_cell, is_safe_cell, HOME_ENTRY_OFFSET, HOME_LEN};
use super::state::{GameState, PieceStatus, Position};

/// The die face that releases yard pieces and grants an extra turn
pub const ENTRY_ROLL: u8 = 6;

/// Compute where a piece would land for a die value. `None` means the
/// piece cannot move with this roll.
pub fn compute_next_position(position: Position, dice_value: u8) -> Option<Position> {
    match position {
        Position::Yard { .. } => {
            if dice_value == ENTRY_ROLL {
                Some(Position::Track { offset: 0 })
            } else {
                None
            }
        }
        Position::Track { offset } => {
            let next = offset + dice_value;
            if next <= HOME_ENTRY_OFFSET {
                Some(Position::Track { offset: next })
            } else {
                let excess = next - HOME_ENTRY_OFFSET;
                match excess.cmp(&HOME_LEN) {
                    std::cmp::Ordering::Less => Some(Position::Home { offset: excess }),
                    std::cmp::Ordering::Equal => Some(Position::Finished),
                    std::cmp::Ordering::Greater => None,
                }
            }
        }
        Position::Home { offset } => {
            let next = offset + dice_value;
            match next.cmp(&HOME_LEN) {
                std::cmp::Ordering::Less => Some(Position::Home { offset: next }),
                std::cmp::Ordering::Equal => Some(Position::Finished),
                std::cmp::Ordering::Greater => None,
            }
        }
        Position::Finished => None,
    }
}

/// A move is illegal when it is a no-op or when the destination holds
/// another of the acting player's own unfinished pieces.
pub fn is_legal_move(
    state: &GameState,
    player_idx: usize,
    piece_id: u8,
    new_position: Position,
) -> bool {
    let Some(player) = state.players.get(player_idx) else {
        return false;
    };
    let Some(piece) = player.piece(piece_id) else {
        return false;
    };

    if piece.position == new_position {
        return false;
    }

    // Finished is a shared sink, never blocked
    if new_position == Position::Finished {
        return true;
    }

    // Self-block: same-color pieces compare in relative coordinates
    !player
        .pieces
        .iter()
        .any(|other| other.id != piece_id && other.position == new_position)
}

/// Find an opposing piece captured by landing on `target`. Captures are
/// disallowed on safe cells and outside the shared track.
pub fn detect_capture(
    state: &GameState,
    acting_idx: usize,
    target: Position,
) -> Option<(usize, u8)> {
    let Position::Track { offset } = target else {
        return None;
    };
    let acting_color = state.players.get(acting_idx)?.color;
    let cell = absolute_cell(acting_color, offset);
    if is_safe_cell(cell) {
        return None;
    }

    for (idx, player) in state.players.iter().enumerate() {
        if idx == acting_idx {
            continue;
        }
        for piece in &player.pieces {
            if let Position::Track { offset: theirs } = piece.position {
                if absolute_cell(player.color, theirs) == cell {
                    return Some((idx, piece.id));
                }
            }
        }
    }
    None
}

/// Whether a position means the piece has completed its circuit
pub fn has_reached_home(position: Position) -> bool {
    position == Position::Finished
}

/// A player wins when all four pieces are finished
pub fn has_player_won(state: &GameState, player_idx: usize) -> bool {
    state
        .players
        .get(player_idx)
        .map(|p| p.has_won())
        .unwrap_or(false)
}

/// Enumerate every legal `(piece_id, destination)` for a roll
pub fn legal_moves(state: &GameState, player_idx: usize, dice_value: u8) -> Vec<(u8, Position)> {
    let Some(player) = state.players.get(player_idx) else {
        return Vec::new();
    };
    player
        .pieces
        .iter()
        .filter(|p| p.status() != PieceStatus::Finished)
        .filter_map(|p| {
            compute_next_position(p.position, dice_value).and_then(|next| {
                is_legal_move(state, player_idx, p.id, next).then_some((p.id, next))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Player, PlayerColor};

    fn two_player_state() -> GameState {
        GameState::new(
            "game-1",
            vec![
                Player::new("alice", PlayerColor::Red),
                Player::new("bob", PlayerColor::Green),
            ],
        )
    }

    #[test]
    fn test_yard_exit_requires_six() {
        let yard = Position::Yard { slot: 0 };
        assert_eq!(compute_next_position(yard, 6), Some(Position::Track { offset: 0 }));
        for roll in 1..=5 {
            assert_eq!(compute_next_position(yard, roll), None);
        }
    }

    #[test]
    fn test_track_advance() {
        let pos = Position::Track { offset: 10 };
        assert_eq!(compute_next_position(pos, 4), Some(Position::Track { offset: 14 }));
    }

    #[test]
    fn test_home_entry_overflow() {
        // From 48 with a 5: excess = 53 - 50 = 3, home offset 3
        let pos = Position::Track { offset: 48 };
        assert_eq!(compute_next_position(pos, 5), Some(Position::Home { offset: 3 }));

        // From 50 with a 6: excess = 6, finished exactly
        let pos = Position::Track { offset: 50 };
        assert_eq!(compute_next_position(pos, 6), Some(Position::Finished));
    }

    #[test]
    fn test_home_overshoot_illegal() {
        let pos = Position::Home { offset: 4 };
        assert_eq!(compute_next_position(pos, 2), Some(Position::Finished));
        assert_eq!(compute_next_position(pos, 3), None);
    }

    #[test]
    fn test_finished_piece_never_moves() {
        assert_eq!(compute_next_position(Position::Finished, 6), None);
    }

    #[test]
    fn test_self_block_is_illegal() {
        let mut state = two_player_state();
        state.players[0].pieces[0].position = Position::Track { offset: 5 };
        state.players[0].pieces[1].position = Position::Track { offset: 2 };
        // Piece 1 moving 3 would land on its sibling at offset 5
        assert!(!is_legal_move(&state, 0, 1, Position::Track { offset: 5 }));
        // A different destination is fine
        assert!(is_legal_move(&state, 0, 1, Position::Track { offset: 6 }));
    }

    #[test]
    fn test_capture_on_open_cell() {
        let mut state = two_player_state();
        // Green relative 5 = absolute 18; red relative 18 = absolute 18
        state.players[1].pieces[2].position = Position::Track { offset: 5 };
        let captured = detect_capture(&state, 0, Position::Track { offset: 18 });
        assert_eq!(captured, Some((1, 2)));
    }

    #[test]
    fn test_no_capture_on_safe_cell() {
        let mut state = two_player_state();
        // Absolute cell 21 is a star cell; green relative 8 = absolute 21
        state.players[1].pieces[0].position = Position::Track { offset: 8 };
        let captured = detect_capture(&state, 0, Position::Track { offset: 21 });
        assert_eq!(captured, None);
    }

    #[test]
    fn test_no_capture_in_home_stretch() {
        let state = two_player_state();
        assert_eq!(detect_capture(&state, 0, Position::Home { offset: 2 }), None);
    }

    #[test]
    fn test_legal_moves_from_yard() {
        let state = two_player_state();
        assert!(legal_moves(&state, 0, 3).is_empty());
        let moves = legal_moves(&state, 0, 6);
        // All four yard pieces could enter, but they all target the start
        // cell; entering with any one of them is legal since the cell is empty
        assert_eq!(moves.len(), 4);
        assert!(moves.iter().all(|(_, pos)| *pos == Position::Track { offset: 0 }));
    }
}
