//! Play chess at the terminal against an external UCI engine.
//!
//! Run with:
//! `cargo run --release -- --engine ./chess_engine`
//! `cargo run --release -- --engine stockfish --color black --movetime 1000`

use std::io::{self, Write};

use anyhow::{Context, Result};

use uci_play::engine::engine_process::EngineProcess;
use uci_play::engine::engine_session::EngineSession;
use uci_play::errors::ConfigError;
use uci_play::play::game_driver::GameDriver;
use uci_play::play::play_config::{PlayConfig, USAGE};

/// Conventional status for a process ended by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() -> Result<()> {
    let config = match PlayConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(ConfigError::HelpRequested) => {
            println!("{USAGE}");
            return Ok(());
        }
        Err(err) => {
            return Err(anyhow::Error::new(err).context("invalid arguments (try --help)"));
        }
    };

    let process = EngineProcess::spawn(&config.engine, config.response_timeout)?;
    if config.verbose {
        eprintln!(
            "[play] engine {} started, pid={:?}",
            config.engine.program.display(),
            process.id()
        );
    }

    let release = process.release_handle();
    let verbose = config.verbose;
    ctrlc::set_handler(move || {
        let mut stdout = io::stdout();
        let _ = writeln!(stdout, "\n\nGame interrupted. Thanks for playing!")
            .and_then(|()| stdout.flush());
        if let Err(err) = release.interrupt() {
            eprintln!("[play] engine release failed: {err}");
        } else if verbose {
            eprintln!("[play] interrupted, engine released");
        }
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
    .context("failed to install the interrupt handler")?;

    let session = EngineSession::new(process).with_verbose(config.verbose);
    let mut driver = GameDriver::new(session, config);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let outcome = driver
        .run(stdin.lock(), &mut stdout)
        .context("game aborted")?;

    if driver.config().verbose {
        eprintln!(
            "[play] outcome={outcome:?} plies={}",
            driver.game_state().move_history().len()
        );
    }
    Ok(())
}
