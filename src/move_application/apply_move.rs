//! Apply a compact-notation move to a [`GameState`].
//!
//! Only bookkeeping is performed: the two preconditions are an occupied source
//! square and a piece of the side to move. Reachability, checks and castling
//! rights are not examined; legal input is the caller's responsibility.
//!
//! Special moves are recognised from the move shape and the board:
//! 1. a king moving two files onto the g or c file also relocates the
//!    matching rook;
//! 2. a pawn changing file onto an empty square removes the pawn beside it;
//! 3. a fifth character replaces the arriving piece with that kind.

use crate::errors::MoveError;
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::move_text::MoveText;

/// Extra board effects of a move beyond relocating the moving piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialMove {
    Quiet,
    Castling { rook_from: Square, rook_to: Square },
    EnPassant { captured: Square },
}

/// Returns the next state; `game_state` itself is never modified.
pub fn apply_move(game_state: &GameState, move_text: &str) -> Result<GameState, MoveError> {
    let mv = MoveText::parse(move_text)?;

    let piece = game_state
        .piece_at(mv.from)
        .ok_or(MoveError::EmptySource { square: mv.from })?;

    if piece.color != game_state.side_to_move {
        return Err(MoveError::WrongSide {
            side_to_move: game_state.side_to_move,
            square: mv.from,
            owner: piece.color,
            token: piece.token(),
        });
    }

    let mut next = game_state.clone();

    match classify_move(game_state, &mv, piece) {
        SpecialMove::Castling { rook_from, rook_to } => {
            next.set(rook_from, None);
            next.set(rook_to, Some(Piece::new(piece.color, PieceKind::Rook)));
        }
        SpecialMove::EnPassant { captured } => next.set(captured, None),
        SpecialMove::Quiet => {}
    }

    let arriving = match mv.promotion {
        Some(kind) => Piece::new(piece.color, kind),
        None => piece,
    };
    next.set(mv.to, Some(arriving));
    next.set(mv.from, None);

    next.move_history.push(mv.to_string());
    next.side_to_move = game_state.side_to_move.opposite();

    Ok(next)
}

/// Tag the special effect of `mv`, judged against the position before it.
pub fn classify_move(game_state: &GameState, mv: &MoveText, piece: Piece) -> SpecialMove {
    match piece.kind {
        PieceKind::King if mv.file_delta().abs() == 2 => {
            // The king's destination file names the side: g castles short, c castles long.
            let (rook_col, landing_col) = match mv.to.col() {
                6 => (7, 5),
                2 => (0, 3),
                _ => return SpecialMove::Quiet,
            };
            SpecialMove::Castling {
                rook_from: mv.from.with_col(rook_col),
                rook_to: mv.from.with_col(landing_col),
            }
        }
        PieceKind::Pawn if mv.file_delta() != 0 && game_state.piece_at(mv.to).is_none() => {
            SpecialMove::EnPassant {
                captured: mv.from.with_col(mv.to.col() as u8),
            }
        }
        _ => SpecialMove::Quiet,
    }
}
