#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;

const REPLYING_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "id name ShellFish"; echo "id author Script"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "info depth 1 score cp 5"; echo "bestmove e7e5" ;;
    quit) exit 0 ;;
  esac
done
"#;

const RESIGNING_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "bestmove 0000" ;;
    quit) exit 0 ;;
  esac
done
"#;

const SILENT_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    quit) exit 0 ;;
  esac
done
"#;

const CRASHING_ENGINE: &str = r#"read -r line; echo "uciok""#;

fn play_against(script: &str) -> Command {
    let mut cmd = Command::cargo_bin("uci_play").expect("binary should be built");
    cmd.args(["--engine", "sh", "--engine-arg", "-c", "--engine-arg", script]);
    cmd
}

#[test]
fn plays_a_move_pair_and_lists_history() {
    play_against(REPLYING_ENGINE)
        .write_stdin("e2e4\nmoves\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("=== ShellFish ==="))
        .stdout(predicate::str::contains("by Script"))
        .stdout(predicate::str::contains("Engine plays: e7e5"))
        .stdout(predicate::str::contains("Move history: e2e4 e7e5"))
        .stdout(predicate::str::contains("Thanks for playing!"));
}

#[test]
fn verbose_mode_traces_protocol_on_stderr() {
    play_against(REPLYING_ENGINE)
        .arg("--verbose")
        .write_stdin("quit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("[engine] >> uci"))
        .stderr(predicate::str::contains("[engine] << uciok"))
        .stderr(predicate::str::contains("[play] outcome=HumanQuit"));
}

#[test]
fn no_move_sentinel_ends_the_game() {
    play_against(RESIGNING_ENGINE)
        .write_stdin("f2f3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Game Over! Checkmate or Stalemate"));
}

#[test]
fn engine_exiting_early_aborts_the_game() {
    play_against(CRASHING_ENGINE)
        .write_stdin("e2e4\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("closed its streams"));
}

#[test]
fn silent_engine_trips_the_watchdog() {
    play_against(SILENT_ENGINE)
        .args(["--timeout", "300"])
        .write_stdin("e2e4\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not answer"));
}

#[test]
fn missing_engine_fails_to_start() {
    Command::cargo_bin("uci_play")
        .expect("binary should be built")
        .args(["--engine", "./definitely-not-an-engine"])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to start engine"));
}

#[test]
fn help_prints_usage() {
    Command::cargo_bin("uci_play")
        .expect("binary should be built")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: uci_play"));
}

#[test]
fn unknown_flag_is_rejected() {
    Command::cargo_bin("uci_play")
        .expect("binary should be built")
        .arg("--depth")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown argument '--depth'"));
}

/// Engine that ignores SIGINT, records its pid when asked to search, and
/// then never answers.
fn stubborn_engine(pid_file: &Path) -> String {
    let pid = pid_file.display();
    format!(
        r#"
trap '' INT
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo $$ > '{pid}.tmp'; mv '{pid}.tmp' '{pid}'; sleep 5 </dev/null >/dev/null 2>&1 ;;
    quit) exit 0 ;;
  esac
done
"#
    )
}

fn wait_for_pid(pid_file: &Path, limit: Duration) -> u32 {
    let deadline = Instant::now() + limit;
    loop {
        if let Ok(text) = fs::read_to_string(pid_file) {
            if let Ok(pid) = text.trim().parse() {
                return pid;
            }
        }
        assert!(Instant::now() < deadline, "engine never started searching");
        thread::sleep(Duration::from_millis(20));
    }
}

fn process_alive(pid: u32) -> bool {
    StdCommand::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[test]
fn interrupt_during_search_releases_the_engine() {
    let pid_file =
        std::env::temp_dir().join(format!("uci_play_engine_{}.pid", std::process::id()));
    let _ = fs::remove_file(&pid_file);

    let mut client = StdCommand::new(cargo_bin("uci_play"))
        .args(["--engine", "sh", "--engine-arg", "-c", "--engine-arg"])
        .arg(stubborn_engine(&pid_file))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("client should start");
    client
        .stdin
        .as_mut()
        .expect("stdin should be piped")
        .write_all(b"e2e4\n")
        .expect("move should be written");

    let engine_pid = wait_for_pid(&pid_file, Duration::from_secs(10));
    assert!(process_alive(engine_pid));

    let sent = StdCommand::new("kill")
        .args(["-INT", &client.id().to_string()])
        .status()
        .expect("kill should run");
    assert!(sent.success());

    let output = client.wait_with_output().expect("client should exit");
    let _ = fs::remove_file(&pid_file);

    assert_eq!(output.status.code(), Some(130));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Engine is thinking..."));
    assert!(stdout.contains("Game interrupted. Thanks for playing!"));
    assert!(!process_alive(engine_pid), "engine outlived the client");
}
