//! Compact UCI move notation.
//!
//! `is_valid_move_format` is the pure syntactic gate used on human input; it
//! never looks at a position. `MoveText` is the parsed view of one history
//! entry: source, destination and an optional promotion kind.

use std::fmt;

use crate::errors::MoveError;
use crate::game_state::chess_rules::{FILE_LETTERS, PROMOTION_LETTERS, RANK_DIGITS};
use crate::game_state::chess_types::{PieceKind, Square};
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};

/// Check if `text` is in compact UCI format (`e2e4`, `e7e8q`).
pub fn is_valid_move_format(text: &str) -> bool {
    let chars = text.chars().collect::<Vec<_>>();
    if chars.len() < 4 || chars.len() > 5 {
        return false;
    }
    if !FILE_LETTERS.contains(chars[0]) || !FILE_LETTERS.contains(chars[2]) {
        return false;
    }
    if !RANK_DIGITS.contains(chars[1]) || !RANK_DIGITS.contains(chars[3]) {
        return false;
    }
    if chars.len() == 5 && !PROMOTION_LETTERS.contains(chars[4]) {
        return false;
    }
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveText {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveText {
    pub fn parse(text: &str) -> Result<Self, MoveError> {
        if !is_valid_move_format(text) {
            return Err(MoveError::InvalidFormat(text.to_owned()));
        }

        // Format check above guarantees ASCII, so byte slicing is safe.
        let invalid = || MoveError::InvalidFormat(text.to_owned());
        let from = algebraic_to_square(&text[0..2]).ok_or_else(invalid)?;
        let to = algebraic_to_square(&text[2..4]).ok_or_else(invalid)?;
        let promotion = match text.chars().nth(4) {
            Some(letter) => Some(PieceKind::from_letter(letter).ok_or_else(invalid)?),
            None => None,
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }

    /// Signed column displacement, positive towards file h.
    #[inline]
    pub fn file_delta(&self) -> i8 {
        self.to.col() as i8 - self.from.col() as i8
    }
}

impl fmt::Display for MoveText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            square_to_algebraic(self.from),
            square_to_algebraic(self.to)
        )?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}
