//! The line-oriented capability an engine session drives.
//!
//! `EngineSession` only ever sends one command line, reads one response line,
//! or releases the engine. Any transport offering those three operations can
//! stand in for a real process, which is how the session and driver tests run
//! without spawning anything.

use crate::errors::EngineError;

pub trait EngineChannel {
    /// Write one command line (the newline is added by the channel).
    fn send(&mut self, command: &str) -> Result<(), EngineError>;

    /// Block until the engine produces a line. `Ok(None)` means the output
    /// stream is closed and no further lines will arrive.
    fn read_line(&mut self) -> Result<Option<String>, EngineError>;

    /// Release the engine. Must be safe to call repeatedly, including after
    /// the engine has already exited.
    fn terminate(&mut self) -> Result<(), EngineError>;
}
