//! Game state model: pieces, players and the authoritative game record
//!
//! Positions are an explicit tagged union so illegal states are
//! unrepresentable: a piece's status is derived from its position domain
//! rather than stored alongside it.

use serde::{Deserialize, Serialize};

use super::board::PIECES_PER_PLAYER;

/// The four-color palette. Colors are unique within a game and assigned
/// in join order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Green,
    Yellow,
    Blue,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Green,
        PlayerColor::Yellow,
        PlayerColor::Blue,
    ];
}

/// Where a piece sits. Track and home offsets are color-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// Holding area; `slot` is one of the four fixed yard slots
    Yard { slot: u8 },
    /// Shared 52-cell ring, `offset` in `0..=50` relative to the color's start
    Track { offset: u8 },
    /// Private home stretch, `offset` in `1..=5`
    Home { offset: u8 },
    /// Completed the full circuit
    Finished,
}

/// Derived piece status; always consistent with the position domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceStatus {
    InYard,
    OnBoard,
    Finished,
}

/// A single piece. Pieces are created at game initialization and only
/// ever change position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: u8,
    pub position: Position,
}

impl Piece {
    /// A fresh piece resting in its own yard slot
    pub fn in_yard(id: u8) -> Self {
        Self {
            id,
            position: Position::Yard { slot: id },
        }
    }

    /// Status derived from the position domain
    pub fn status(&self) -> PieceStatus {
        match self.position {
            Position::Yard { .. } => PieceStatus::InYard,
            Position::Track { .. } | Position::Home { .. } => PieceStatus::OnBoard,
            Position::Finished => PieceStatus::Finished,
        }
    }
}

/// A seated player with their four pieces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub user_id: String,
    pub color: PlayerColor,
    pub pieces: [Piece; 4],
    pub is_ai: bool,
}

impl Player {
    pub fn new(user_id: impl Into<String>, color: PlayerColor) -> Self {
        Self {
            user_id: user_id.into(),
            color,
            pieces: [
                Piece::in_yard(0),
                Piece::in_yard(1),
                Piece::in_yard(2),
                Piece::in_yard(3),
            ],
            is_ai: false,
        }
    }

    pub fn piece(&self, piece_id: u8) -> Option<&Piece> {
        self.pieces.get(piece_id as usize)
    }

    /// All four pieces finished means this player has won
    pub fn has_won(&self) -> bool {
        self.pieces
            .iter()
            .all(|p| p.status() == PieceStatus::Finished)
    }

    /// Count of pieces in each status bucket; always sums to 4
    pub fn status_counts(&self) -> (u8, u8, u8) {
        let mut counts = (0u8, 0u8, 0u8);
        for piece in &self.pieces {
            match piece.status() {
                PieceStatus::InYard => counts.0 += 1,
                PieceStatus::OnBoard => counts.1 += 1,
                PieceStatus::Finished => counts.2 += 1,
            }
        }
        debug_assert_eq!(counts.0 + counts.1 + counts.2, PIECES_PER_PLAYER);
        counts
    }
}

/// Game lifecycle status; monotonic, never leaves `Finished`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

/// Record of the most recent applied move
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub user_id: String,
    pub piece_id: u8,
    pub dice_value: u8,
    pub from: Position,
    pub to: Position,
    pub captured: Option<CapturedPiece>,
}

/// Reference to a piece sent back to its yard by a capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedPiece {
    pub user_id: String,
    pub piece_id: u8,
}

/// Authoritative state for one match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: String,
    pub players: Vec<Player>,
    pub current_player: usize,
    /// The pending roll awaiting a move, if any
    pub dice_value: Option<u8>,
    pub status: GameStatus,
    pub winner: Option<String>,
    pub last_move: Option<MoveRecord>,
}

impl GameState {
    /// Build the initial state for a seated player list. Colors must
    /// already be unique; callers assign them in join order.
    pub fn new(game_id: impl Into<String>, players: Vec<Player>) -> Self {
        Self {
            game_id: game_id.into(),
            players,
            current_player: 0,
            dice_value: None,
            status: GameStatus::Playing,
            winner: None,
            last_move: None,
        }
    }

    pub fn player_index(&self, user_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.user_id == user_id)
    }

    pub fn current(&self) -> &Player {
        &self.players[self.current_player]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_derived_from_position() {
        let mut piece = Piece::in_yard(2);
        assert_eq!(piece.status(), PieceStatus::InYard);

        piece.position = Position::Track { offset: 10 };
        assert_eq!(piece.status(), PieceStatus::OnBoard);

        piece.position = Position::Home { offset: 3 };
        assert_eq!(piece.status(), PieceStatus::OnBoard);

        piece.position = Position::Finished;
        assert_eq!(piece.status(), PieceStatus::Finished);
    }

    #[test]
    fn test_piece_conservation_at_start() {
        let player = Player::new("alice", PlayerColor::Red);
        assert_eq!(player.status_counts(), (4, 0, 0));
        assert!(!player.has_won());
    }
}
