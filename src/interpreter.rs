// src/interpreter.rs

//! Running assembled programs in a child interpreter
//!
//! The program is passed inline (`python3 -c <program>`), never written to
//! disk. stdin is nulled so a recipe calling `input()` fails instead of
//! hanging, and stdout/stderr are captured separately.
//!
//! There is no deadline unless one is configured. With a timeout the child
//! is killed once it expires and whatever it had written to stderr is kept
//! for the error. Processes the recipe itself started are not killed, but
//! they cannot hold the call past the deadline by keeping the pipes open.

use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Captured result of one interpreter run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    /// Everything the program wrote to stdout
    pub stdout: String,
    /// Everything the program wrote to stderr
    pub stderr: String,
    /// Exit code (None if the process was killed by a signal)
    pub exit_code: Option<i32>,
}

impl ExecutionResult {
    /// Whether the program exited with status zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that can run an assembled program
///
/// Implementations return `Err` only when the program could not be run to
/// completion (spawn failure, timeout). A program that ran and exited
/// non-zero is reported through [`ExecutionResult::exit_code`].
pub trait Executor {
    /// Run `program` and capture its output
    fn execute(&self, program: &str) -> Result<ExecutionResult>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, program: &str) -> Result<ExecutionResult> {
        (**self).execute(program)
    }
}

/// Executor backed by a real Python interpreter process
#[derive(Debug, Clone, Default)]
pub struct PythonExecutor {
    config: BridgeConfig,
}

impl PythonExecutor {
    /// Create an executor from a bridge configuration
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// The configuration this executor runs with
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Resolve the configured interpreter to a path - NO FALLBACK
    fn resolve_interpreter(&self) -> Result<PathBuf> {
        which::which(&self.config.interpreter).map_err(|_| Error::InterpreterNotFound {
            interpreter: self.config.interpreter.clone(),
        })
    }

    fn command(&self, interpreter: &Path, program: &str) -> Command {
        let mut cmd = Command::new(interpreter);
        cmd.arg("-c")
            .arg(program)
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> Error {
        Error::Spawn {
            interpreter: self.config.interpreter.clone(),
            source,
        }
    }

    /// Run to completion with no deadline
    fn run_unbounded(&self, mut cmd: Command) -> Result<ExecutionResult> {
        let output = cmd.output().map_err(|e| self.spawn_error(e))?;

        Ok(ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }

    /// Run with a deadline, killing the child when it expires
    ///
    /// Both pipes are drained on their own threads; otherwise a chatty child
    /// would block on a full pipe and always look like it timed out. A
    /// process the recipe started can keep the pipes open after the child
    /// is gone, so output is only collected for [`PIPE_GRACE`] past exit.
    fn run_with_timeout(&self, mut cmd: Command, timeout: Duration) -> Result<ExecutionResult> {
        let mut child = cmd.spawn().map_err(|e| self.spawn_error(e))?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(timeout) {
            Ok(status) => status,
            Err(e) => {
                kill(&mut child);
                return Err(e.into());
            }
        };

        match status {
            Some(status) => Ok(ExecutionResult {
                stdout: collect(stdout, PIPE_GRACE),
                stderr: collect(stderr, PIPE_GRACE),
                exit_code: status.code(),
            }),
            None => {
                kill(&mut child);
                Err(Error::TimedOut {
                    timeout,
                    stderr: collect(stderr, PIPE_GRACE),
                })
            }
        }
    }
}

impl Executor for PythonExecutor {
    fn execute(&self, program: &str) -> Result<ExecutionResult> {
        let interpreter = self.resolve_interpreter()?;
        debug!(
            "Executing recipe with {} ({} bytes of program text)",
            interpreter.display(),
            program.len()
        );

        let cmd = self.command(&interpreter, program);
        let result = match self.config.timeout {
            Some(timeout) => self.run_with_timeout(cmd, timeout)?,
            None => self.run_unbounded(cmd)?,
        };

        for line in result.stdout.lines() {
            debug!("[recipe] {}", line);
        }
        for line in result.stderr.lines() {
            warn!("[recipe] {}", line);
        }

        if result.success() {
            info!("Recipe completed successfully");
        } else {
            info!("Recipe exited with code {:?}", result.exit_code);
        }

        Ok(result)
    }
}

/// How long to keep reading a pipe once the child has exited or been killed
const PIPE_GRACE: Duration = Duration::from_millis(500);

/// Forward everything read from `pipe` as chunks until EOF
///
/// The thread is detached. If a leftover process holds the pipe open it
/// lives on until that process closes it.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match pipe.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        debug!("Failed to read recipe output: {}", e);
                        break;
                    }
                }
            }
        });
        rx
    })
}

/// Gather drained output until EOF, or until `grace` passes without it
fn collect(chunks: Option<Receiver<Vec<u8>>>, grace: Duration) -> String {
    let Some(chunks) = chunks else {
        return String::new();
    };

    let deadline = Instant::now() + grace;
    let mut buf = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match chunks.recv_timeout(remaining) {
            Ok(chunk) => buf.extend_from_slice(&chunk),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                debug!("Recipe output still open after exit; keeping what was read");
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("Failed to kill timed out recipe: {}", e);
    }
    // Reap the child so it does not linger as a zombie
    if let Err(e) = child.wait() {
        debug!("Failed to reap timed out recipe: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_execution_result_success() {
        let ok = ExecutionResult {
            exit_code: Some(0),
            ..Default::default()
        };
        assert!(ok.success());

        let failed = ExecutionResult {
            exit_code: Some(1),
            ..Default::default()
        };
        assert!(!failed.success());

        let signalled = ExecutionResult::default();
        assert!(!signalled.success());
    }

    #[test]
    fn test_missing_interpreter() {
        let executor = PythonExecutor::new(
            BridgeConfig::new().with_interpreter("definitely-not-a-python-interpreter"),
        );
        let err = executor.execute("print(1)").unwrap_err();
        assert!(matches!(err, Error::InterpreterNotFound { .. }));
    }

    #[test]
    fn test_command_shape() {
        let executor = PythonExecutor::new(BridgeConfig::new().with_env("PYWAY_TEST", "1"));
        let cmd = executor.command(Path::new("/usr/bin/python3"), "print(1)");

        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["-c", "print(1)"]);
        let envs: Vec<_> = cmd.get_envs().collect();
        assert!(envs.iter().any(|(k, v)| *k == "PYWAY_TEST" && *v == Some(OsStr::new("1"))));
    }

    #[test]
    fn test_collect_reads_until_eof() {
        let chunks = drain(Some(&b"hello\nworld\n"[..]));
        assert_eq!(collect(chunks, Duration::from_secs(5)), "hello\nworld\n");
        assert_eq!(collect(None, Duration::from_secs(5)), "");
    }

    #[test]
    fn test_collect_gives_up_on_held_pipe() {
        let (tx, rx) = mpsc::channel();
        tx.send(b"partial".to_vec()).unwrap();

        // Sender stays alive, as when another process still holds the pipe
        let start = Instant::now();
        let out = collect(Some(rx), Duration::from_millis(50));

        assert_eq!(out, "partial");
        assert!(start.elapsed() < Duration::from_secs(5));
        drop(tx);
    }
}
