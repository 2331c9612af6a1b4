//! Error types used throughout the crate.
//!
//! Three families mirror the three places things go wrong:
//! - [`MoveError`] for move text the board model refuses. Format errors are
//!   caught without board knowledge; semantic errors need the position.
//! - [`EngineError`] for the external engine process and its protocol.
//! - [`PlayError`] for the interactive driver, which wraps both plus terminal
//!   I/O.
//!
//! [`ConfigError`] covers command-line parsing for the binary.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::engine::engine_session::SessionState;
use crate::game_state::chess_types::{Color, Square};

/// Why a move could not be applied. The position is never modified when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The text is not compact UCI notation.
    #[error("invalid move format '{0}'")]
    InvalidFormat(String),

    #[error("No piece on {square}")]
    EmptySource { square: Square },

    #[error("It's {side_to_move}'s turn, but {square} has a {owner} piece ({token})")]
    WrongSide {
        side_to_move: Color,
        square: Square,
        owner: Color,
        token: char,
    },
}

impl MoveError {
    /// True for errors that required board context to detect.
    pub fn is_semantic(&self) -> bool {
        !matches!(self, MoveError::InvalidFormat(_))
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("engine I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The process exited or closed its streams before answering.
    #[error("engine process closed its streams {context}")]
    Disconnected { context: &'static str },

    /// The response watchdog expired.
    #[error("engine did not answer within {waited:?}")]
    Stalled { waited: Duration },

    #[error("malformed bestmove line: '{0}'")]
    MalformedBestMove(String),

    /// Handshake ordering is mandatory: nothing but `start` is valid before it.
    #[error("cannot {operation} while the engine session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("search time budget must be positive")]
    InvalidTimeBudget,
}

impl EngineError {
    /// Errors after which the engine process can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::Io(_)
                | EngineError::Disconnected { .. }
                | EngineError::Stalled { .. }
                | EngineError::MalformedBestMove(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum PlayError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),

    #[error("engine move '{mv}' was rejected by the board: {source}")]
    EngineMoveRejected {
        mv: String,
        #[source]
        source: MoveError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("help requested")]
    HelpRequested,

    #[error("unknown argument '{0}'")]
    UnknownArgument(String),

    #[error("missing value for '{0}'")]
    MissingValue(String),

    #[error("invalid value '{value}' for '{flag}': {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: &'static str,
    },
}
