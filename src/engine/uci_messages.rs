//! UCI command builders and response-line classification for the client side
//! of the protocol.

use crate::errors::EngineError;
use crate::game_state::chess_rules::NO_MOVE_SENTINEL;

pub const CMD_UCI: &str = "uci";
pub const CMD_ISREADY: &str = "isready";
pub const CMD_UCINEWGAME: &str = "ucinewgame";
pub const CMD_QUIT: &str = "quit";

pub const ACK_UCIOK: &str = "uciok";
pub const ACK_READYOK: &str = "readyok";

/// The engine's answer to a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestMove {
    Move(String),
    /// Checkmate or stalemate: there is nothing to apply.
    NoLegalMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdField {
    Name,
    Author,
}

/// `position startpos [moves m1 m2 ...]`; the `moves` part is omitted for an
/// empty history.
pub fn position_command(history: &[String]) -> String {
    let mut command = String::from("position startpos");
    if !history.is_empty() {
        command.push_str(" moves ");
        command.push_str(&history.join(" "));
    }
    command
}

pub fn go_movetime_command(movetime_ms: u64) -> String {
    format!("go movetime {movetime_ms}")
}

#[inline]
pub fn is_info_line(line: &str) -> bool {
    line.split_whitespace().next() == Some("info")
}

/// Parse `id name ...` / `id author ...`; the value keeps inner spaces.
pub fn parse_id_line(line: &str) -> Option<(IdField, String)> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("id") {
        return None;
    }
    let field = match tokens.next()? {
        "name" => IdField::Name,
        "author" => IdField::Author,
        _ => return None,
    };
    let value = tokens.collect::<Vec<_>>().join(" ");
    if value.is_empty() {
        return None;
    }
    Some((field, value))
}

/// `None` when `line` is not a `bestmove` line. Trailing `ponder ...` tokens
/// are ignored.
pub fn parse_bestmove_line(line: &str) -> Option<Result<BestMove, EngineError>> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return None;
    }

    let parsed = match tokens.next() {
        Some(token) if token == NO_MOVE_SENTINEL || token == "(none)" => Ok(BestMove::NoLegalMove),
        Some(token) => Ok(BestMove::Move(token.to_owned())),
        None => Err(EngineError::MalformedBestMove(line.to_owned())),
    };
    Some(parsed)
}
