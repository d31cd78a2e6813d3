//! Board geometry for the Ludo track
//!
//! Static lookup tables mapping color-relative positions to absolute ring
//! cells, plus the safe-spot set. Pure data and pure functions; the move
//! rules in [`super::rules`] build on these.

use super::state::PlayerColor;

/// Number of cells on the shared ring
pub const TRACK_LEN: u8 = 52;

/// Last color-relative track offset before a piece turns into its home stretch
pub const HOME_ENTRY_OFFSET: u8 = 50;

/// Length of the private home stretch; reaching this offset finishes a piece
pub const HOME_LEN: u8 = 6;

/// Pieces owned by each player
pub const PIECES_PER_PLAYER: u8 = 4;

/// Yard slots per color
pub const YARD_SLOTS: u8 = 4;

/// Absolute ring cells where captures are disallowed: the four start cells
/// and the four star cells.
pub const SAFE_CELLS: [u8; 8] = [0, 8, 13, 21, 26, 34, 39, 47];

impl PlayerColor {
    /// Absolute ring cell where this color's pieces enter the track
    pub fn start_cell(&self) -> u8 {
        match self {
            PlayerColor::Red => 0,
            PlayerColor::Green => 13,
            PlayerColor::Yellow => 26,
            PlayerColor::Blue => 39,
        }
    }
}

/// Convert a color-relative track offset to an absolute ring cell
pub fn absolute_cell(color: PlayerColor, offset: u8) -> u8 {
    debug_assert!(offset < TRACK_LEN);
    (color.start_cell() + offset) % TRACK_LEN
}

/// Whether the given absolute ring cell is a safe spot
pub fn is_safe_cell(cell: u8) -> bool {
    SAFE_CELLS.contains(&cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_cells_are_safe() {
        for color in PlayerColor::ALL {
            assert!(is_safe_cell(color.start_cell()));
        }
    }

    #[test]
    fn test_absolute_cell_wraps() {
        // Blue starts at 39; relative offset 20 wraps past the ring end
        assert_eq!(absolute_cell(PlayerColor::Blue, 20), 7);
        // Red's offsets are identity
        assert_eq!(absolute_cell(PlayerColor::Red, 13), 13);
    }

    #[test]
    fn test_colors_land_on_distinct_cells() {
        // The same relative offset maps to four distinct absolute cells
        let cells: Vec<u8> = PlayerColor::ALL
            .iter()
            .map(|c| absolute_cell(*c, 5))
            .collect();
        for i in 0..cells.len() {
            for j in (i + 1)..cells.len() {
                assert_ne!(cells[i], cells[j]);
            }
        }
    }
}
