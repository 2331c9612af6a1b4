//! Settings for an interactive game and their command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use crate::engine::engine_process::EngineCommand;
use crate::errors::ConfigError;
use crate::game_state::chess_types::Color;
use crate::utils::render_game_state::RenderStyle;

pub const USAGE: &str = "\
Play chess against a UCI engine.

Usage: uci_play [OPTIONS]

Options:
  --engine PATH        engine executable (default: ./chess_engine)
  --engine-arg ARG     extra argument for the engine, repeatable
  --movetime MS        engine thinking time per move (default: 3000)
  --color white|black  side you play (default: white)
  --timeout MS         give up if the engine is silent this long (default: wait forever)
  --unicode            draw pieces with chess glyphs
  -v, --verbose        trace engine protocol traffic to stderr
  -h, --help           show this help

At the prompt enter moves in UCI notation (e2e4, e7e8q), 'moves' for the
history, or 'quit' to leave.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayConfig {
    pub engine: EngineCommand,
    pub movetime_ms: u64,
    pub human_color: Color,
    /// `None` blocks on the engine indefinitely.
    pub response_timeout: Option<Duration>,
    pub render_style: RenderStyle,
    pub verbose: bool,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            engine: EngineCommand::default(),
            movetime_ms: 3000,
            human_color: Color::Light,
            response_timeout: None,
            render_style: RenderStyle::Letters,
            verbose: false,
        }
    }
}

impl PlayConfig {
    /// Parse arguments (without the program name) on top of the defaults.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--engine" => config.engine.program = PathBuf::from(value_for(&arg, &mut args)?),
                "--engine-arg" => config.engine.args.push(value_for(&arg, &mut args)?),
                "--movetime" => {
                    let value = value_for(&arg, &mut args)?;
                    config.movetime_ms = parse_positive_ms(&arg, value)?;
                }
                "--color" => {
                    let value = value_for(&arg, &mut args)?;
                    config.human_color = match value.to_ascii_lowercase().as_str() {
                        "white" | "w" => Color::Light,
                        "black" | "b" => Color::Dark,
                        _ => {
                            return Err(ConfigError::InvalidValue {
                                flag: arg,
                                value,
                                reason: "expected 'white' or 'black'",
                            })
                        }
                    };
                }
                "--timeout" => {
                    let value = value_for(&arg, &mut args)?;
                    let ms = parse_positive_ms(&arg, value)?;
                    config.response_timeout = Some(Duration::from_millis(ms));
                }
                "--unicode" => config.render_style = RenderStyle::Unicode,
                "--verbose" | "-v" => config.verbose = true,
                "--help" | "-h" => return Err(ConfigError::HelpRequested),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(config)
    }
}

fn value_for(flag: &str, args: &mut impl Iterator<Item = String>) -> Result<String, ConfigError> {
    args.next()
        .ok_or_else(|| ConfigError::MissingValue(flag.to_owned()))
}

fn parse_positive_ms(flag: &str, value: String) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::InvalidValue {
            flag: flag.to_owned(),
            value,
            reason: "expected a positive number of milliseconds",
        }),
    }
}
