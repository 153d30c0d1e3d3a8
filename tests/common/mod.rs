// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use pyway::{ExecutionResult, Executor, Result, ValueSet};
use serde_json::Value;
use std::sync::Mutex;

/// Build a value set from literal pairs.
pub fn values(entries: &[(&str, Value)]) -> ValueSet {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// Whether a real `python3` is available to run recipes.
///
/// Tests that need one return early (with a note on stderr) when it is not.
pub fn python_available() -> bool {
    if which::which("python3").is_ok() {
        return true;
    }
    eprintln!("Skipping: python3 not found on PATH");
    false
}

/// Executor that records every program and replies with canned output.
pub struct SpyExecutor {
    reply: ExecutionResult,
    programs: Mutex<Vec<String>>,
}

impl SpyExecutor {
    /// Reply with `stdout` and exit code zero.
    pub fn replying(stdout: &str) -> Self {
        Self {
            reply: ExecutionResult {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            },
            programs: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `stderr` and a non-zero exit code.
    pub fn exiting(code: i32, stderr: &str) -> Self {
        Self {
            reply: ExecutionResult {
                stdout: String::new(),
                stderr: stderr.to_string(),
                exit_code: Some(code),
            },
            programs: Mutex::new(Vec::new()),
        }
    }

    /// Number of times the executor was invoked.
    pub fn calls(&self) -> usize {
        self.programs.lock().unwrap().len()
    }

    /// Programs received, in order.
    pub fn programs(&self) -> Vec<String> {
        self.programs.lock().unwrap().clone()
    }
}

impl Executor for SpyExecutor {
    fn execute(&self, program: &str) -> Result<ExecutionResult> {
        self.programs.lock().unwrap().push(program.to_string());
        Ok(self.reply.clone())
    }
}
