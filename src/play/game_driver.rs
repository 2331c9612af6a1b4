//! Interactive game loop: a human at a terminal against a UCI engine.
//!
//! The driver owns the board and the engine session outright. Turns alternate
//! synchronously; on the human's turn a line is read and fed to the board, on
//! the engine's turn the full history is sent for a move which is then applied
//! the same way. Rejected human input is reported and re-prompted with no state
//! change. The engine is released whenever `run` returns, successfully or not.

use std::io::{BufRead, Write};

use crate::engine::engine_channel::EngineChannel;
use crate::engine::engine_session::{EngineSession, Handshake};
use crate::engine::uci_messages::{is_info_line, BestMove};
use crate::errors::PlayError;
use crate::game_state::chess_rules::NO_MOVE_SENTINEL;
use crate::game_state::chess_types::Color;
use crate::game_state::game_state::GameState;
use crate::moves::move_text::is_valid_move_format;
use crate::play::play_config::PlayConfig;
use crate::utils::render_game_state::{format_move_history, render_game_state};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    HumanQuit,
    /// The terminal reached end of input.
    InputClosed,
    /// The engine reported that `side_to_move` has no legal move.
    NoLegalMove { side_to_move: Color },
}

pub struct GameDriver<C: EngineChannel> {
    game_state: GameState,
    engine: EngineSession<C>,
    config: PlayConfig,
}

impl<C: EngineChannel> GameDriver<C> {
    pub fn new(engine: EngineSession<C>, config: PlayConfig) -> Self {
        Self {
            game_state: GameState::new_game(),
            engine,
            config,
        }
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn engine(&self) -> &EngineSession<C> {
        &self.engine
    }

    pub fn config(&self) -> &PlayConfig {
        &self.config
    }

    /// Handshake, then play until the human quits, input ends, or the engine
    /// has no move. The engine is stopped on every return path.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        out: &mut W,
    ) -> Result<GameOutcome, PlayError> {
        let played = self.play(&mut input, out);
        let released = self.engine.stop();

        let outcome = played?;
        released?;
        writeln!(out, "\nThanks for playing!")?;
        out.flush()?;
        Ok(outcome)
    }

    fn play<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        out: &mut W,
    ) -> Result<GameOutcome, PlayError> {
        let handshake = self.engine.start()?;
        self.print_banner(&handshake, out)?;

        loop {
            writeln!(
                out,
                "\n{}\n",
                render_game_state(&self.game_state, self.config.render_style)
            )?;

            let step = if self.game_state.side_to_move() == self.config.human_color {
                self.human_turn(input, out)?
            } else {
                self.engine_turn(out)?
            };

            if let Some(outcome) = step {
                return Ok(outcome);
            }
        }
    }

    fn print_banner<W: Write>(&self, handshake: &Handshake, out: &mut W) -> Result<(), PlayError> {
        let name = handshake.engine_name.as_deref().unwrap_or("UCI Engine");
        writeln!(out, "=== {name} ===")?;
        if let Some(author) = &handshake.engine_author {
            writeln!(out, "by {author}")?;
        }
        for line in handshake.diagnostics.iter().filter(|l| is_info_line(l)) {
            writeln!(out, "  Engine: {line}")?;
        }
        writeln!(
            out,
            "You are {}. Enter moves in UCI format (e.g., e2e4)",
            self.config.human_color
        )?;
        writeln!(out, "Type 'quit' to exit, 'moves' to see move history")?;
        Ok(())
    }

    fn human_turn<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        out: &mut W,
    ) -> Result<Option<GameOutcome>, PlayError> {
        write!(out, "Your move ({}): ", self.config.human_color)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(Some(GameOutcome::InputClosed));
        }

        let command = line.trim().to_lowercase();
        match command.as_str() {
            "quit" => return Ok(Some(GameOutcome::HumanQuit)),
            "moves" => writeln!(
                out,
                "Move history: {}",
                format_move_history(self.game_state.move_history())
            )?,
            text if !is_valid_move_format(text) => {
                writeln!(out, "Invalid move format! Use UCI notation (e.g., e2e4)")?
            }
            text => {
                if let Err(err) = self.game_state.apply(text) {
                    writeln!(out, "Error applying move: {err}")?;
                }
            }
        }
        Ok(None)
    }

    fn engine_turn<W: Write>(&mut self, out: &mut W) -> Result<Option<GameOutcome>, PlayError> {
        writeln!(out, "Engine is thinking...")?;
        out.flush()?;

        // Info lines are shown while the engine is still searching.
        let mut terminal_error = None;
        let reply = self.engine.request_move_with(
            self.game_state.move_history(),
            self.config.movetime_ms,
            |info| {
                if terminal_error.is_none() {
                    let shown = writeln!(out, "  {info}").and_then(|()| out.flush());
                    terminal_error = shown.err();
                }
            },
        )?;
        if let Some(err) = terminal_error {
            return Err(err.into());
        }

        match reply.best_move {
            BestMove::NoLegalMove => {
                writeln!(out, "Engine plays: {NO_MOVE_SENTINEL}\n")?;
                writeln!(out, "Game Over! Checkmate or Stalemate")?;
                Ok(Some(GameOutcome::NoLegalMove {
                    side_to_move: self.game_state.side_to_move(),
                }))
            }
            BestMove::Move(mv) => {
                writeln!(out, "Engine plays: {mv}\n")?;
                if let Err(source) = self.game_state.apply(&mv) {
                    return Err(PlayError::EngineMoveRejected { mv, source });
                }
                Ok(None)
            }
        }
    }
}
