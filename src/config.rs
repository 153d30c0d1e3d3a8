// src/config.rs

//! Configuration for the recipe bridge
//!
//! The defaults reproduce the plain behavior: run `python3` from `PATH`,
//! inherit the host environment, and wait for the recipe however long it
//! takes. A TOML file can override any of these:
//!
//! ```toml
//! interpreter = "/usr/bin/python3.12"
//! timeout_secs = 30
//!
//! [env]
//! PYTHONHASHSEED = "0"
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Interpreter used when none is configured
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Configuration for a [`RecipeBridge`](crate::RecipeBridge)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Interpreter command name or path
    pub interpreter: String,
    /// Kill the recipe after this long (None = wait indefinitely)
    pub timeout: Option<Duration>,
    /// Extra environment variables for the child, on top of the inherited ones
    pub env: BTreeMap<String, String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            timeout: None,
            env: BTreeMap::new(),
        }
    }
}

/// On-disk shape of the configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    interpreter: Option<String>,
    timeout_secs: Option<u64>,
    env: BTreeMap<String, String>,
}

impl BridgeConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Set the execution deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add an environment variable for the child process
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Parse a configuration from a TOML string
    ///
    /// Keys missing from the document keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid bridge config: {}", e)))?;

        if file.timeout_secs == Some(0) {
            return Err(Error::Config(
                "timeout_secs must be greater than zero (omit it to disable the timeout)"
                    .to_string(),
            ));
        }

        let mut config = Self::default();
        if let Some(interpreter) = file.interpreter {
            if interpreter.trim().is_empty() {
                return Err(Error::Config("interpreter cannot be empty".to_string()));
            }
            config.interpreter = interpreter;
        }
        config.timeout = file.timeout_secs.map(Duration::from_secs);
        config.env = file.env;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }
}
