//! Crate root module declarations for the UCI play client.
//!
//! This file exposes the board model (game state, move text, move
//! application), the engine session that drives an external UCI engine, the
//! interactive game driver, and the rendering helpers so the binary, tests
//! and benches can import stable module paths.

pub mod errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
}

pub mod moves {
    pub mod move_text;
}

pub mod move_application {
    pub mod apply_move;
}

pub mod engine {
    pub mod engine_channel;
    pub mod engine_process;
    pub mod engine_session;
    pub mod uci_messages;
}

pub mod play {
    pub mod game_driver;
    pub mod play_config;
}

pub mod utils {
    pub mod algebraic;
    pub mod render_game_state;
}
