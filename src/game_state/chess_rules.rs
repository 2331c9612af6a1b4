//! Canonical chess-rule constants.
//!
//! Static literals for the starting layout, the coordinate alphabets used by
//! compact move notation, and the engine's "no legal move" sentinel.

/// Starting layout, one string per row from rank 8 down to rank 1.
/// `.` marks an empty square.
pub const STARTING_ROWS: [&str; 8] = [
    "rnbqkbnr", "pppppppp", "........", "........", "........", "........", "PPPPPPPP",
    "RNBQKBNR",
];

pub const FILE_LETTERS: &str = "abcdefgh";
pub const RANK_DIGITS: &str = "12345678";
pub const PROMOTION_LETTERS: &str = "qrbn";

/// `bestmove` value an engine sends when the side to move has no legal move.
pub const NO_MOVE_SENTINEL: &str = "0000";
