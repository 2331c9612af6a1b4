//! Board model: position, side to move, and the move history.
//!
//! `GameState` is owned by whoever drives the game and is only changed through
//! [`GameState::apply`]. The history is kept in compact notation because it is
//! both the display log and the exact payload the engine needs to rebuild the
//! position (`position startpos moves ...`).

use crate::errors::MoveError;
use crate::game_state::chess_rules::STARTING_ROWS;
use crate::game_state::chess_types::*;
use crate::move_application::apply_move::apply_move;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) squares: [[Option<Piece>; 8]; 8],
    pub(crate) side_to_move: Color,
    pub(crate) move_history: Vec<String>,
}

impl GameState {
    pub fn new_game() -> Self {
        let mut squares = [[None; 8]; 8];
        for (row, layout) in STARTING_ROWS.iter().enumerate() {
            for (col, token) in layout.chars().enumerate() {
                squares[row][col] = Piece::from_token(token);
            }
        }

        Self {
            squares,
            side_to_move: Color::Light,
            move_history: Vec::new(),
        }
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row()][square.col()]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn move_history(&self) -> &[String] {
        &self.move_history
    }

    /// Rows from rank 8 to rank 1, for renderers.
    #[inline]
    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.squares
    }

    /// Apply one move in compact notation. On error `self` is untouched.
    pub fn apply(&mut self, move_text: &str) -> Result<(), MoveError> {
        *self = apply_move(self, move_text)?;
        Ok(())
    }

    #[inline]
    pub(crate) fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.row()][square.col()] = piece;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new_game()
    }
}
