//! Ludo game core
//!
//! This module holds the deterministic heart of the platform:
//!
//! - [`board`]: static geometry of the 52-cell ring, safe spots and
//!   per-color start cells
//! - [`state`]: pieces, players and the authoritative [`GameState`]
//! - [`rules`]: pure move legality, capture and victory detection
//! - [`turn`]: the roll/move phase machine and player rotation
//!
//! Everything here is synchronous and free of I/O; the room manager
//! wraps it with persistence and event broadcast.

pub mod board;
pub mod rules;
pub mod state;
pub mod turn;

pub use board::{absolute_cell, is_safe_cell, HOME_LEN, SAFE_CELLS, TRACK_LEN};
pub use rules::{
    compute_next_position, detect_capture, has_player_won, has_reached_home, is_legal_move,
    legal_moves, ENTRY_ROLL,
};
pub use state::{
    CapturedPiece, GameState, GameStatus, MoveRecord, Piece, PieceStatus, Player, PlayerColor,
    Position,
};
pub use turn::{advance_turn, apply_move, apply_roll, phase, MoveOutcome, RollOutcome, TurnPhase};
