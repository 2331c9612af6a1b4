//! Square conversions for compact coordinate text.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and the board's
//! `(row, col)` grid, where row 0 is rank 8 and col 0 is file a.

use crate::game_state::chess_types::Square;

/// Convert a coordinate such as "e4" to a grid square.
#[inline]
pub fn algebraic_to_square(square: &str) -> Option<Square> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return None;
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }

    Square::new(b'8' - rank, file - b'a')
}

/// Convert a grid square to its coordinate (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    let file_char = char::from(b'a' + square.col() as u8);
    let rank_char = char::from(b'8' - square.row() as u8);

    format!("{file_char}{rank_char}")
}

#[cfg(test)]
mod tests {
    use super::{algebraic_to_square, square_to_algebraic};
    use crate::game_state::chess_types::Square;

    #[test]
    fn corner_squares_map_to_grid_corners() {
        let a8 = algebraic_to_square("a8").expect("a8 should parse");
        assert_eq!((a8.row(), a8.col()), (0, 0));
        let h1 = algebraic_to_square("h1").expect("h1 should parse");
        assert_eq!((h1.row(), h1.col()), (7, 7));
        let e2 = algebraic_to_square("e2").expect("e2 should parse");
        assert_eq!((e2.row(), e2.col()), (6, 4));
    }

    #[test]
    fn grid_squares_print_as_coordinates() {
        let square = Square::new(4, 4).expect("square should exist");
        assert_eq!(square_to_algebraic(square), "e4");
        assert_eq!(square.to_string(), "e4");
    }

    #[test]
    fn malformed_coordinates_are_rejected() {
        assert!(algebraic_to_square("i1").is_none());
        assert!(algebraic_to_square("a9").is_none());
        assert!(algebraic_to_square("a").is_none());
        assert!(algebraic_to_square("A1").is_none());
    }
}
