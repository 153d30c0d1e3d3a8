// src/lib.rs

//! pyway: run Python recipes against host values
//!
//! A host hands over a named set of JSON values and a block of Python (the
//! recipe). The recipe sees each value as a top-level variable, rebinds the
//! ones the host declared mutable, and the updated values are merged back.
//!
//! # Architecture
//!
//! - Stateless: every call verifies, assembles, and runs from scratch
//! - One child process per call (`python3 -c <program>`), nothing on disk
//! - JSON both ways: values go in as Python literals, results come back as
//!   the last JSON line on stdout
//! - Pluggable [`Executor`] so hosts and tests can replace the interpreter

pub mod config;
mod error;
pub mod interpreter;
pub mod recipe;

use std::collections::HashMap;

pub use config::{BridgeConfig, DEFAULT_INTERPRETER};
pub use error::{Error, ErrorKind, Result};
pub use interpreter::{ExecutionResult, Executor, PythonExecutor};
pub use recipe::{RecipeBridge, check, execute, normalize_indentation, verify_usage};

/// Named values exchanged with a recipe
pub type ValueSet = HashMap<String, serde_json::Value>;
