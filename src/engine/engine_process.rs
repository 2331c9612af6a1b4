//! [`EngineChannel`] backed by an operating-system process.
//!
//! The engine's stdin and stdout are piped; its stderr is inherited so engine
//! diagnostics reach the terminal directly. Stdout is read on a dedicated
//! thread that forwards whole lines over an `mpsc` channel, which lets
//! `read_line` honour an optional response deadline.
//!
//! The child and its stdin live behind a mutex shared with every
//! [`EngineReleaseHandle`], so an interrupt handler can release the engine
//! while the session is blocked on a read.

use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::engine::engine_channel::EngineChannel;
use crate::engine::uci_messages::CMD_QUIT;
use crate::errors::EngineError;

/// How long a released engine gets to exit on its own before it is killed.
const EXIT_GRACE: Duration = Duration::from_millis(500);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Program and arguments used to launch the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Default for EngineCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./chess_engine"),
            args: Vec::new(),
        }
    }
}

/// The parts of the engine that must be released exactly once, shared with
/// any [`EngineReleaseHandle`].
struct Attached {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

pub struct EngineProcess {
    attached: Arc<Mutex<Attached>>,
    lines: Receiver<io::Result<String>>,
    response_timeout: Option<Duration>,
}

/// Releases the engine from another thread, e.g. an interrupt handler, while
/// the owning session may be blocked on a read.
#[derive(Clone)]
pub struct EngineReleaseHandle {
    attached: Arc<Mutex<Attached>>,
}

impl EngineReleaseHandle {
    /// Send `quit` if the engine is still attached, then release it.
    /// Harmless if the engine was already released.
    pub fn interrupt(&self) -> Result<(), EngineError> {
        let mut attached = lock(&self.attached);
        if let Some(stdin) = attached.stdin.as_mut() {
            let _ = writeln!(stdin, "{CMD_QUIT}").and_then(|()| stdin.flush());
        }
        release(&mut attached)
    }
}

impl EngineProcess {
    /// Launch the engine. With `response_timeout` set, a read that waits
    /// longer than that fails with [`EngineError::Stalled`].
    pub fn spawn(
        command: &EngineCommand,
        response_timeout: Option<Duration>,
    ) -> Result<Self, EngineError> {
        let spawn_error = |source: io::Error| EngineError::Spawn {
            program: command.program.display().to_string(),
            source,
        };

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error)?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                reap(&mut child);
                return Err(spawn_error(io::Error::other("engine stdio was not piped")));
            }
        };

        let (tx, lines) = channel();
        let reader = thread::Builder::new()
            .name("engine-stdout".to_owned())
            .spawn(move || forward_lines(stdout, tx));
        if let Err(err) = reader {
            reap(&mut child);
            return Err(spawn_error(err));
        }

        Ok(Self {
            attached: Arc::new(Mutex::new(Attached {
                child: Some(child),
                stdin: Some(stdin),
            })),
            lines,
            response_timeout,
        })
    }

    /// OS process id, while the engine has not been released.
    pub fn id(&self) -> Option<u32> {
        lock(&self.attached).child.as_ref().map(Child::id)
    }

    pub fn release_handle(&self) -> EngineReleaseHandle {
        EngineReleaseHandle {
            attached: Arc::clone(&self.attached),
        }
    }
}

impl EngineChannel for EngineProcess {
    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        let mut attached = lock(&self.attached);
        let stdin = attached.stdin.as_mut().ok_or(EngineError::Disconnected {
            context: "after it was released",
        })?;

        let written = writeln!(stdin, "{command}").and_then(|()| stdin.flush());
        match written {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                Err(EngineError::Disconnected {
                    context: "while sending a command",
                })
            }
            Err(err) => Err(EngineError::Io(err)),
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, EngineError> {
        let received = match self.response_timeout {
            Some(limit) => match self.lines.recv_timeout(limit) {
                Ok(line) => Some(line),
                Err(RecvTimeoutError::Disconnected) => None,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(EngineError::Stalled { waited: limit })
                }
            },
            None => self.lines.recv().ok(),
        };

        match received {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(err)) => Err(EngineError::Io(err)),
            None => Ok(None),
        }
    }

    fn terminate(&mut self) -> Result<(), EngineError> {
        release(&mut lock(&self.attached))
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        let _ = self.terminate();
    }
}

fn lock(attached: &Mutex<Attached>) -> MutexGuard<'_, Attached> {
    attached.lock().unwrap_or_else(PoisonError::into_inner)
}

fn release(attached: &mut Attached) -> Result<(), EngineError> {
    // Closing stdin is the engine's cue that no more commands follow.
    drop(attached.stdin.take());

    let Some(mut child) = attached.child.take() else {
        return Ok(());
    };

    if !wait_with_grace(&mut child, EXIT_GRACE) {
        match child.kill() {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::InvalidInput => {}
            Err(err) => return Err(EngineError::Io(err)),
        }
    }
    child.wait()?;
    Ok(())
}

fn forward_lines(stdout: ChildStdout, tx: Sender<io::Result<String>>) {
    for line in BufReader::new(stdout).lines() {
        let failed = line.is_err();
        if tx.send(line).is_err() || failed {
            break;
        }
    }
}

/// True once the child has exited; false if it is still running at the
/// deadline.
fn wait_with_grace(child: &mut Child, grace: Duration) -> bool {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return true,
            Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL_INTERVAL),
            _ => return false,
        }
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
