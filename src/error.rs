// src/error.rs

//! Error types for the recipe bridge

use std::time::Duration;
use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure category of an [`Error`]
///
/// Every bridge failure falls into exactly one of these; callers that only
/// care about "what went wrong" rather than the details can match on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inputs or settings are inconsistent (unknown mutable key, bad value
    /// name, unreadable configuration file)
    Configuration,
    /// A declared value is never referenced by the recipe
    Usage,
    /// The interpreter could not be run or the recipe failed
    Execution,
    /// The recipe's output could not be recovered
    Extraction,
}

/// Errors that can occur while compiling or running a recipe
#[derive(Error, Debug)]
pub enum Error {
    /// A mutable name is not a key of the value set
    #[error("unknown mutable key '{0}': not present in the value set")]
    UnknownMutableKey(String),

    /// A value name cannot be declared as a Python variable
    ///
    /// Raised for empty names, names not shaped like a (Unicode) identifier,
    /// keywords, and the `_pyway_*` aliases the program preamble binds.
    #[error("invalid value name '{0}': expected a Python identifier")]
    InvalidName(String),

    /// One or more values are never referenced by the recipe
    #[error("not all keys are used in the recipe (unused: {})", .0.join(", "))]
    UnusedKeys(Vec<String>),

    /// The interpreter binary could not be located
    #[error("interpreter not found: {interpreter}")]
    InterpreterNotFound { interpreter: String },

    /// The interpreter process could not be started
    #[error("failed to spawn {interpreter}: {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    /// The recipe exited unsuccessfully
    #[error(
        "recipe failed with exit code {}\n{}",
        .code.map_or_else(|| "none (killed by signal)".to_string(), |c| c.to_string()),
        .stderr
    )]
    Failed { code: Option<i32>, stderr: String },

    /// The recipe ran past the configured deadline and was killed
    #[error("recipe timed out after {} seconds\n{}", .timeout.as_secs_f64(), .stderr)]
    TimedOut { timeout: Duration, stderr: String },

    /// IO error while talking to the child process
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No stdout line looked like a JSON array or object
    #[error("recipe produced no structured output")]
    MissingOutput,

    /// The structured output line was not a valid JSON object
    #[error("failed to parse recipe output: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    /// Bridge configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownMutableKey(_) | Self::InvalidName(_) | Self::Config(_) => {
                ErrorKind::Configuration
            }
            Self::UnusedKeys(_) => ErrorKind::Usage,
            Self::InterpreterNotFound { .. }
            | Self::Spawn { .. }
            | Self::Failed { .. }
            | Self::TimedOut { .. }
            | Self::Io(_) => ErrorKind::Execution,
            Self::MissingOutput | Self::MalformedOutput(_) => ErrorKind::Extraction,
        }
    }

    /// Captured stderr of the child process, if the error carries one
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } | Self::TimedOut { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}
