//! Running tool commands through the platform shell with a timeout.

use std::fs::File;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, mpsc};
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Result, SaveError};

/// Exit code and captured output of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

/// Executes shell commands. A non-zero exit code is data, not an error.
pub trait ProcessRunner {
    /// # Errors
    /// Returns an error if the command is blank, cannot be started, or does
    /// not finish within `timeout`.
    fn exec(&self, command: &str, stdin: Option<&Path>, timeout: Duration)
    -> Result<ExecutionResult>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedirectMode {
    /// Capture stdout and stderr into temp files and read them back.
    #[default]
    Internal,
    /// The command redirects its own output; nothing is captured.
    External,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShellProcessRunner {
    redirect: RedirectMode,
}

impl ShellProcessRunner {
    #[must_use]
    pub const fn new(redirect: RedirectMode) -> Self {
        Self { redirect }
    }
}

struct Capture {
    stdout: NamedTempFile,
    stderr: NamedTempFile,
}

impl Capture {
    fn new() -> Result<Self> {
        Ok(Self {
            stdout: NamedTempFile::new()?,
            stderr: NamedTempFile::new()?,
        })
    }

    fn read(&self) -> Result<(Vec<String>, Vec<String>)> {
        Ok((read_lines(self.stdout.path())?, read_lines(self.stderr.path())?))
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|source| SaveError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(String::from)
        .collect())
}

impl ProcessRunner for ShellProcessRunner {
    fn exec(
        &self,
        command: &str,
        stdin: Option<&Path>,
        timeout: Duration,
    ) -> Result<ExecutionResult> {
        if command.trim().is_empty() {
            return Err(SaveError::ProcessExecution(
                "executable command is blank".to_string(),
            ));
        }

        let mut cmd = shell_command(command);
        cmd.stdin(match stdin {
            Some(path) => Stdio::from(File::open(path).map_err(|source| {
                SaveError::FileRead {
                    path: path.to_path_buf(),
                    source,
                }
            })?),
            None => Stdio::null(),
        });

        let capture = match self.redirect {
            RedirectMode::Internal => {
                let capture = Capture::new()?;
                cmd.stdout(Stdio::from(capture.stdout.reopen()?));
                cmd.stderr(Stdio::from(capture.stderr.reopen()?));
                Some(capture)
            }
            RedirectMode::External => {
                cmd.stdout(Stdio::null());
                cmd.stderr(Stdio::null());
                None
            }
        };

        debug!(command, timeout_millis = timeout.as_millis(), "executing");
        let child = cmd.spawn().map_err(|e| {
            SaveError::ProcessExecution(format!("failed to start '{command}': {e}"))
        })?;

        let status = wait_with_timeout(child, command, timeout, kill_tree)?;

        let (stdout, stderr) = match &capture {
            Some(capture) => capture.read()?,
            None => (Vec::new(), Vec::new()),
        };
        Ok(ExecutionResult {
            code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

/// How often the waiter polls the child for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long a killed child may take to be reaped before `exec` gives up on it.
const REAP_GRACE: Duration = Duration::from_millis(500);

/// Wait for `child` on a scoped thread while this thread keeps the timer.
///
/// The child stays reachable from both sides: the waiter polls it, and on
/// timeout this thread kills its process tree and the child itself. The
/// waiter is always stopped before the scope is left.
fn wait_with_timeout(
    child: Child,
    command: &str,
    timeout: Duration,
    kill_tree: fn(u32),
) -> Result<ExitStatus> {
    let pid = child.id();
    let child = Mutex::new(child);
    let stop = AtomicBool::new(false);

    std::thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        let (waited, stopped) = (&child, &stop);
        scope.spawn(move || poll_exit(waited, stopped, &tx));

        let outcome = match rx.recv_timeout(timeout) {
            Ok(status) => Ok(status?),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(pid, "command timed out, killing it");
                kill_tree(pid);
                if let Ok(mut child) = child.lock() {
                    let _ = child.kill();
                }
                if rx.recv_timeout(REAP_GRACE).is_err() {
                    warn!(pid, "killed command was not reaped in time");
                }
                Err(SaveError::ProcessTimeout {
                    command: command.to_string(),
                    timeout_millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(SaveError::ProcessExecution(
                "waiter thread exited without a status".to_string(),
            )),
        };
        stop.store(true, Ordering::Relaxed);
        outcome
    })
}

fn poll_exit(
    child: &Mutex<Child>,
    stop: &AtomicBool,
    tx: &mpsc::Sender<std::io::Result<ExitStatus>>,
) {
    while !stop.load(Ordering::Relaxed) {
        let polled = match child.lock() {
            Ok(mut child) => child.try_wait(),
            Err(_) => return,
        };
        match polled {
            Ok(Some(status)) => {
                let _ = tx.send(Ok(status));
                return;
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    use std::os::unix::process::CommandExt;

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    // Own process group, so a timeout can take the whole tree down.
    cmd.process_group(0);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(unix)]
fn kill_tree(pid: u32) {
    let group = format!("-{pid}");
    let killed = Command::new("kill")
        .args(["-KILL", "--", &group])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success());
    if !killed {
        let _ = Command::new("kill")
            .args(["-KILL", &pid.to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
}

#[cfg(windows)]
fn kill_tree(pid: u32) {
    let _ = Command::new("taskkill")
        .args(["/F", "/T", "/PID", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
