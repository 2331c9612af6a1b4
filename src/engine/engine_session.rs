//! Client side of a UCI conversation with one external engine.
//!
//! The session owns its channel exclusively and walks a fixed lifecycle:
//!
//! ```text
//! Unstarted --start--> Handshaking --(uciok, readyok)--> Ready
//! Ready --request_move--> Searching --(bestmove)--> Ready
//! any --stop / fatal error--> Terminated
//! ```
//!
//! Every read blocks until the engine answers (or the channel's own deadline
//! expires). Fatal errors release the engine immediately; `stop` and `Drop`
//! release it otherwise, so the process is never leaked.

use std::fmt;

use crate::engine::engine_channel::EngineChannel;
use crate::engine::uci_messages::*;
use crate::errors::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unstarted,
    Handshaking,
    Ready,
    Searching,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unstarted => "unstarted",
            SessionState::Handshaking => "handshaking",
            SessionState::Ready => "ready",
            SessionState::Searching => "searching",
            SessionState::Terminated => "terminated",
        };
        write!(f, "{name}")
    }
}

/// What the engine said about itself during the handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handshake {
    pub engine_name: Option<String>,
    pub engine_author: Option<String>,
    /// Lines other than the acknowledgements and `id` lines.
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReply {
    pub best_move: BestMove,
    /// `info ...` lines received while searching, in arrival order.
    pub info_lines: Vec<String>,
}

pub struct EngineSession<C: EngineChannel> {
    channel: C,
    state: SessionState,
    verbose: bool,
}

impl<C: EngineChannel> EngineSession<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            state: SessionState::Unstarted,
            verbose: false,
        }
    }

    /// Trace every protocol line to stderr.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Run the `uci` / `isready` / `ucinewgame` handshake.
    pub fn start(&mut self) -> Result<Handshake, EngineError> {
        if self.state != SessionState::Unstarted {
            return Err(EngineError::InvalidState {
                operation: "start the engine",
                state: self.state,
            });
        }

        self.state = SessionState::Handshaking;
        let result = self.handshake();
        if result.is_ok() {
            self.state = SessionState::Ready;
        }
        self.settle(result)
    }

    /// Ask for a move from the start position followed by `history`.
    ///
    /// Blocks until a `bestmove` line arrives. [`BestMove::NoLegalMove`] means
    /// the game is over and must not be applied to the board.
    pub fn request_move(
        &mut self,
        history: &[String],
        movetime_ms: u64,
    ) -> Result<EngineReply, EngineError> {
        self.request_move_with(history, movetime_ms, |_| {})
    }

    /// Like [`request_move`](Self::request_move), but hands each `info` line
    /// to `on_info` as soon as it is read.
    pub fn request_move_with<F>(
        &mut self,
        history: &[String],
        movetime_ms: u64,
        on_info: F,
    ) -> Result<EngineReply, EngineError>
    where
        F: FnMut(&str),
    {
        if self.state != SessionState::Ready {
            return Err(EngineError::InvalidState {
                operation: "request a move",
                state: self.state,
            });
        }
        if movetime_ms == 0 {
            return Err(EngineError::InvalidTimeBudget);
        }

        self.state = SessionState::Searching;
        let result = self.search(history, movetime_ms, on_info);
        if result.is_ok() {
            self.state = SessionState::Ready;
        }
        self.settle(result)
    }

    /// Send `quit` (best effort) and release the engine. Idempotent.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        if self.state == SessionState::Terminated {
            return Ok(());
        }

        if let Err(err) = self.send(CMD_QUIT) {
            self.trace(&format!("quit not delivered: {err}"));
        }
        self.state = SessionState::Terminated;
        self.channel.terminate()
    }

    fn handshake(&mut self) -> Result<Handshake, EngineError> {
        let mut handshake = Handshake::default();

        self.send(CMD_UCI)?;
        loop {
            let line = self.read("while waiting for uciok")?;
            if line.contains(ACK_UCIOK) {
                break;
            }
            match parse_id_line(&line) {
                Some((IdField::Name, value)) => handshake.engine_name = Some(value),
                Some((IdField::Author, value)) => handshake.engine_author = Some(value),
                None => handshake.diagnostics.push(line),
            }
        }

        self.send(CMD_ISREADY)?;
        loop {
            let line = self.read("while waiting for readyok")?;
            if line.contains(ACK_READYOK) {
                break;
            }
            handshake.diagnostics.push(line);
        }

        self.send(CMD_UCINEWGAME)?;
        Ok(handshake)
    }

    fn search<F>(
        &mut self,
        history: &[String],
        movetime_ms: u64,
        mut on_info: F,
    ) -> Result<EngineReply, EngineError>
    where
        F: FnMut(&str),
    {
        self.send(&position_command(history))?;
        self.send(&go_movetime_command(movetime_ms))?;

        let mut info_lines = Vec::new();
        loop {
            let line = self.read("while waiting for bestmove")?;
            if let Some(best_move) = parse_bestmove_line(&line) {
                return Ok(EngineReply {
                    best_move: best_move?,
                    info_lines,
                });
            }
            if is_info_line(&line) {
                on_info(&line);
                info_lines.push(line);
            }
        }
    }

    /// Tear the engine down after a fatal error, then hand the result back.
    fn settle<T>(&mut self, result: Result<T, EngineError>) -> Result<T, EngineError> {
        if let Err(err) = &result {
            if err.is_fatal() {
                self.trace(&format!("fatal: {err}"));
                self.state = SessionState::Terminated;
                if let Err(release_err) = self.channel.terminate() {
                    self.trace(&format!("release failed: {release_err}"));
                }
            }
        }
        result
    }

    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        self.trace(&format!(">> {command}"));
        self.channel.send(command)
    }

    fn read(&mut self, context: &'static str) -> Result<String, EngineError> {
        let line = self
            .channel
            .read_line()?
            .ok_or(EngineError::Disconnected { context })?;
        self.trace(&format!("<< {line}"));
        Ok(line)
    }

    fn trace(&self, message: &str) {
        if self.verbose {
            eprintln!("[engine] {message}");
        }
    }
}

impl<C: EngineChannel> Drop for EngineSession<C> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineSession, SessionState};
    use crate::engine::engine_channel::testing::{lines, ScriptedEngine};
    use crate::engine::uci_messages::BestMove;
    use crate::errors::EngineError;

    fn ready_session(replies: &[&str]) -> EngineSession<ScriptedEngine> {
        let mut session = EngineSession::new(ScriptedEngine::playing(replies));
        session.start().expect("handshake should complete");
        session
    }

    #[test]
    fn handshake_sends_commands_in_order_and_captures_identity() {
        let mut session = EngineSession::new(ScriptedEngine::playing(&[]));
        assert_eq!(session.state(), SessionState::Unstarted);

        let handshake = session.start().expect("handshake should complete");

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(handshake.engine_name.as_deref(), Some("Scripted"));
        assert_eq!(handshake.engine_author.as_deref(), Some("Tests"));
        assert_eq!(
            handshake.diagnostics,
            ["option name Hash type spin default 16 min 1 max 64"]
        );
        assert_eq!(
            session.channel().transcript().sent(),
            ["uci", "isready", "ucinewgame"]
        );
    }

    #[test]
    fn request_before_handshake_is_refused() {
        let mut session = EngineSession::new(ScriptedEngine::playing(&["e7e5"]));
        let err = session
            .request_move(&[], 1000)
            .expect_err("no handshake yet");

        assert!(matches!(
            err,
            EngineError::InvalidState {
                state: SessionState::Unstarted,
                ..
            }
        ));
        assert!(session.channel().transcript().sent().is_empty());
    }

    #[test]
    fn info_lines_reach_the_callback_before_the_search_ends() {
        let engine = ScriptedEngine::new(|command| match command {
            "uci" => lines(&["uciok"]),
            "isready" => lines(&["readyok"]),
            "go movetime 300" => lines(&[
                "info depth 1 score cp 3",
                "readyok",
                "info depth 2 score cp 7 pv e7e5",
            ]),
            _ => Vec::new(),
        });
        let mut session = EngineSession::new(engine);
        session.start().expect("handshake should complete");

        let mut seen = Vec::new();
        let err = session
            .request_move_with(&[], 300, |line| seen.push(line.to_owned()))
            .expect_err("engine never sends bestmove");

        assert!(matches!(err, EngineError::Disconnected { .. }));
        assert_eq!(
            seen,
            ["info depth 1 score cp 3", "info depth 2 score cp 7 pv e7e5"]
        );
    }

    #[test]
    fn request_move_sends_position_and_go_and_returns_reply() {
        let mut session = ready_session(&["e7e5"]);
        let history = vec!["e2e4".to_owned()];

        let reply = session
            .request_move(&history, 2000)
            .expect("search should complete");

        assert_eq!(reply.best_move, BestMove::Move("e7e5".to_owned()));
        assert_eq!(reply.info_lines, ["info depth 1 score cp 12"]);
        assert_eq!(session.state(), SessionState::Ready);

        let sent = session.channel().transcript().sent();
        assert_eq!(
            &sent[3..],
            ["position startpos moves e2e4", "go movetime 2000"]
        );
    }

    #[test]
    fn empty_history_uses_bare_startpos() {
        let mut session = ready_session(&["e2e4"]);
        session
            .request_move(&[], 500)
            .expect("search should complete");
        let sent = session.channel().transcript().sent();
        assert_eq!(sent[3], "position startpos");
    }

    #[test]
    fn sentinel_is_reported_as_no_legal_move() {
        let mut session = ready_session(&[]);
        let reply = session
            .request_move(&["f2f3".to_owned()], 500)
            .expect("search should complete");
        assert_eq!(reply.best_move, BestMove::NoLegalMove);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn non_info_chatter_during_search_is_skipped() {
        let engine = ScriptedEngine::new(|command| match command {
            "uci" => lines(&["uciok"]),
            "isready" => lines(&["readyok"]),
            "go movetime 100" => lines(&[
                "info string thinking",
                "some unrelated output",
                "bestmove d7d5 ponder c2c4",
            ]),
            _ => Vec::new(),
        });
        let mut session = EngineSession::new(engine);
        session.start().expect("handshake should complete");

        let reply = session
            .request_move(&[], 100)
            .expect("search should complete");
        assert_eq!(reply.best_move, BestMove::Move("d7d5".to_owned()));
        assert_eq!(reply.info_lines, ["info string thinking"]);
    }

    #[test]
    fn engine_exit_during_handshake_is_a_distinct_failure() {
        let engine = ScriptedEngine::new(|command| match command {
            "uci" => lines(&["id name Flaky", "uciok"]),
            _ => Vec::new(),
        });
        let transcript = engine.transcript();
        let mut session = EngineSession::new(engine);

        let err = session.start().expect_err("readyok never arrives");

        assert!(matches!(
            err,
            EngineError::Disconnected {
                context: "while waiting for readyok"
            }
        ));
        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(transcript.terminations(), 1);

        let err = session
            .request_move(&[], 100)
            .expect_err("session is over");
        assert!(matches!(err, EngineError::InvalidState { .. }));
    }

    #[test]
    fn engine_exit_during_search_terminates_session() {
        let engine = ScriptedEngine::new(|command| match command {
            "uci" => lines(&["uciok"]),
            "isready" => lines(&["readyok"]),
            _ => Vec::new(),
        });
        let transcript = engine.transcript();
        let mut session = EngineSession::new(engine);
        session.start().expect("handshake should complete");

        let err = session
            .request_move(&[], 100)
            .expect_err("bestmove never arrives");
        assert!(matches!(err, EngineError::Disconnected { .. }));
        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(transcript.terminations(), 1);
    }

    #[test]
    fn bare_bestmove_line_is_malformed() {
        let engine = ScriptedEngine::new(|command| match command {
            "uci" => lines(&["uciok"]),
            "isready" => lines(&["readyok"]),
            "go movetime 100" => lines(&["bestmove"]),
            _ => Vec::new(),
        });
        let mut session = EngineSession::new(engine);
        session.start().expect("handshake should complete");

        let err = session
            .request_move(&[], 100)
            .expect_err("no move token");
        assert!(matches!(err, EngineError::MalformedBestMove(_)));
    }

    #[test]
    fn zero_time_budget_is_rejected_without_side_effects() {
        let mut session = ready_session(&["e7e5"]);
        let err = session.request_move(&[], 0).expect_err("zero budget");
        assert!(matches!(err, EngineError::InvalidTimeBudget));
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.channel().transcript().sent().len(), 3);
    }

    #[test]
    fn starting_twice_is_refused() {
        let mut session = ready_session(&[]);
        let err = session.start().expect_err("already started");
        assert!(matches!(
            err,
            EngineError::InvalidState {
                state: SessionState::Ready,
                ..
            }
        ));
    }

    #[test]
    fn stop_sends_quit_once_and_is_idempotent() {
        let mut session = ready_session(&[]);
        let transcript = session.channel().transcript();

        session.stop().expect("stop should succeed");
        session.stop().expect("second stop should be a no-op");
        drop(session);

        let sent = transcript.sent();
        assert_eq!(sent.last().map(String::as_str), Some("quit"));
        assert_eq!(sent.iter().filter(|c| c.as_str() == "quit").count(), 1);
        assert_eq!(transcript.terminations(), 1);
    }

    #[test]
    fn dropping_a_live_session_releases_the_engine() {
        let session = ready_session(&[]);
        let transcript = session.channel().transcript();
        drop(session);

        assert_eq!(transcript.sent().last().map(String::as_str), Some("quit"));
        assert_eq!(transcript.terminations(), 1);
    }
}
