//! Terminal-oriented board renderer.
//!
//! Builds a boxed grid from a [`GameState`] for the interactive prompt, using
//! either the board's letter tokens or Unicode chess glyphs. Rendering is a
//! pure function of the position.

use crate::game_state::chess_rules::FILE_LETTERS;
use crate::game_state::{chess_types::*, game_state::GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    /// `K`/`k` style tokens, uppercase for White.
    #[default]
    Letters,
    Unicode,
}

/// Render the board with rank 8 at the top and file labels above and below.
pub fn render_game_state(game_state: &GameState, style: RenderStyle) -> String {
    let labels = FILE_LETTERS
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join("   ");
    let files = format!("    {labels}");
    let border = format!("  +{}", "---+".repeat(8));

    let mut out = String::new();
    out.push_str(&files);
    out.push('\n');
    out.push_str(&border);
    out.push('\n');

    for (row_index, row) in game_state.rows().iter().enumerate() {
        let rank = 8 - row_index;
        let cells = row
            .iter()
            .map(|square| match square {
                Some(piece) => piece_symbol(*piece, style),
                None => ' ',
            })
            .map(String::from)
            .collect::<Vec<_>>()
            .join(" | ");

        out.push_str(&format!("{rank} | {cells} | {rank}\n"));
        out.push_str(&border);
        out.push('\n');
    }

    out.push_str(&files);
    out
}

/// Space-separated history, as sent to the engine after `moves`.
pub fn format_move_history(history: &[String]) -> String {
    history.join(" ")
}

fn piece_symbol(piece: Piece, style: RenderStyle) -> char {
    match style {
        RenderStyle::Letters => piece.token(),
        RenderStyle::Unicode => piece_to_unicode(piece.color, piece.kind),
    }
}

fn piece_to_unicode(color: Color, piece: PieceKind) -> char {
    match (color, piece) {
        (Color::Light, PieceKind::Pawn) => '♙',
        (Color::Light, PieceKind::Knight) => '♘',
        (Color::Light, PieceKind::Bishop) => '♗',
        (Color::Light, PieceKind::Rook) => '♖',
        (Color::Light, PieceKind::Queen) => '♕',
        (Color::Light, PieceKind::King) => '♔',
        (Color::Dark, PieceKind::Pawn) => '♟',
        (Color::Dark, PieceKind::Knight) => '♞',
        (Color::Dark, PieceKind::Bishop) => '♝',
        (Color::Dark, PieceKind::Rook) => '♜',
        (Color::Dark, PieceKind::Queen) => '♛',
        (Color::Dark, PieceKind::King) => '♚',
    }
}
