// src/recipe/mod.rs

//! Compiling and running recipes
//!
//! A recipe is a block of Python that reads host values by their bare names
//! and leaves some of them rebound. Running one goes through these steps, in
//! order, and stops at the first failure:
//!
//! 1. Check every mutable name is a key of the value set, and every key is a
//!    usable Python identifier
//! 2. Check every key is referenced by the recipe (see [`usage`])
//! 3. Normalize indentation and assemble the program (see [`assemble`])
//! 4. Run the program through an [`Executor`]
//! 5. Take the last JSON line of stdout and merge the mutable names back
//!
//! The value set is only written in step 5, after decoding succeeded.
//!
//! # Example
//!
//! ```no_run
//! use pyway::ValueSet;
//! use serde_json::json;
//!
//! let mut values: ValueSet = [
//!     ("x".to_string(), json!(3)),
//!     ("y".to_string(), json!([])),
//! ]
//! .into_iter()
//! .collect();
//!
//! pyway::execute("y = [x * 2]", &mut values, &["y"])?;
//! assert_eq!(values["y"], json!([6]));
//! # Ok::<(), pyway::Error>(())
//! ```

pub mod assemble;
pub mod extract;
pub mod indent;
pub mod literal;
pub mod usage;

use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::interpreter::{Executor, PythonExecutor};
use crate::ValueSet;
use tracing::{debug, info};

pub use assemble::is_valid_name;
pub use extract::extract_payload;
pub use indent::normalize_indentation;
pub use literal::to_python_literal;
pub use usage::verify_usage;

/// Runs recipes through an [`Executor`]
///
/// The bridge holds no per-call state; one instance can run any number of
/// recipes, including from several threads if the executor allows it.
#[derive(Debug, Clone, Default)]
pub struct RecipeBridge<E = PythonExecutor> {
    executor: E,
}

impl RecipeBridge<PythonExecutor> {
    /// Create a bridge that runs recipes in a Python interpreter
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            executor: PythonExecutor::new(config),
        }
    }
}

impl<E: Executor> RecipeBridge<E> {
    /// Create a bridge around a custom executor
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// The executor recipes are run with
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run `recipe` against `values`, then copy the `mutable` names back
    ///
    /// On error `values` is left exactly as it was.
    pub fn execute<S: AsRef<str>>(
        &self,
        recipe: &str,
        values: &mut ValueSet,
        mutable: &[S],
    ) -> Result<()> {
        let program = self.render(recipe, values, mutable)?;

        info!(
            "Running recipe ({} value(s), {} mutable)",
            values.len(),
            mutable.len()
        );
        let result = self.executor.execute(&program)?;

        if !result.success() {
            return Err(Error::Failed {
                code: result.exit_code,
                stderr: result.stderr,
            });
        }

        extract::merge_output(result.stdout.trim(), values, mutable)
    }

    /// Validate the inputs and build the program without running it
    pub fn render<S: AsRef<str>>(
        &self,
        recipe: &str,
        values: &ValueSet,
        mutable: &[S],
    ) -> Result<String> {
        check(recipe, values, mutable)?;
        Ok(assemble::assemble(recipe, values, mutable))
    }
}

/// Run a recipe with the default configuration
///
/// Runs `python3` from `PATH` with no timeout.
pub fn execute<S: AsRef<str>>(recipe: &str, values: &mut ValueSet, mutable: &[S]) -> Result<()> {
    RecipeBridge::new(BridgeConfig::default()).execute(recipe, values, mutable)
}

/// Configuration and usage checks, in that order
///
/// Fails on the first mutable name missing from `values`, then on the first
/// (sorted) value name that is not a valid identifier, then on any value the
/// recipe never mentions.
pub fn check<S: AsRef<str>>(recipe: &str, values: &ValueSet, mutable: &[S]) -> Result<()> {
    for name in mutable {
        let name = name.as_ref();
        if !values.contains_key(name) {
            return Err(Error::UnknownMutableKey(name.to_string()));
        }
    }

    let mut names: Vec<&String> = values.keys().collect();
    names.sort();
    if let Some(bad) = names.iter().find(|name| !is_valid_name(name)) {
        return Err(Error::InvalidName(bad.to_string()));
    }
    debug!("Declared values: {:?}", names);

    let unused = verify_usage(recipe, names);
    if !unused.is_empty() {
        return Err(Error::UnusedKeys(unused));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ExecutionResult;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    /// Replies with canned output and remembers the last program
    struct FakeExecutor {
        reply: ExecutionResult,
        calls: Cell<usize>,
        last_program: RefCell<String>,
    }

    impl FakeExecutor {
        fn replying(stdout: &str) -> Self {
            Self {
                reply: ExecutionResult {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    exit_code: Some(0),
                },
                calls: Cell::new(0),
                last_program: RefCell::new(String::new()),
            }
        }

        fn failing(code: i32, stderr: &str) -> Self {
            let mut fake = Self::replying("");
            fake.reply.exit_code = Some(code);
            fake.reply.stderr = stderr.to_string();
            fake
        }
    }

    impl Executor for FakeExecutor {
        fn execute(&self, program: &str) -> Result<ExecutionResult> {
            self.calls.set(self.calls.get() + 1);
            *self.last_program.borrow_mut() = program.to_string();
            Ok(self.reply.clone())
        }
    }

    fn sample_values() -> ValueSet {
        [("x".to_string(), json!(3)), ("y".to_string(), json!([]))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_unknown_mutable_key_never_executes() {
        let fake = FakeExecutor::replying("{\"z\": 1}");
        let bridge = RecipeBridge::with_executor(&fake);
        let mut values = sample_values();

        let err = bridge.execute("y = [x * 2]", &mut values, &["z"]).unwrap_err();

        assert!(matches!(err, Error::UnknownMutableKey(ref k) if k == "z"));
        assert_eq!(fake.calls.get(), 0);
        assert_eq!(values, sample_values());
    }

    #[test]
    fn test_unused_value_never_executes() {
        let fake = FakeExecutor::replying("{\"y\": [1]}");
        let bridge = RecipeBridge::with_executor(&fake);
        let mut values = sample_values();
        values.insert("unrelated".to_string(), json!("hello"));

        let err = bridge.execute("y = [x * 2]", &mut values, &["y"]).unwrap_err();

        assert!(matches!(err, Error::UnusedKeys(ref k) if k == &["unrelated".to_string()]));
        assert_eq!(fake.calls.get(), 0);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let fake = FakeExecutor::replying("{}");
        let bridge = RecipeBridge::with_executor(&fake);
        let mut values: ValueSet = [("bad-name".to_string(), json!(1))].into_iter().collect();

        let err = bridge
            .execute("bad-name", &mut values, &Vec::<String>::new())
            .unwrap_err();

        assert!(matches!(err, Error::InvalidName(_)));
        assert_eq!(fake.calls.get(), 0);
    }

    #[test]
    fn test_successful_merge() {
        let fake = FakeExecutor::replying("{\"y\": [6]}");
        let bridge = RecipeBridge::with_executor(&fake);
        let mut values = sample_values();

        bridge.execute("y = [x * 2]", &mut values, &["y"]).unwrap();

        assert_eq!(values["y"], json!([6]));
        assert_eq!(values["x"], json!(3));
        assert_eq!(fake.calls.get(), 1);
        assert!(fake.last_program.borrow().contains("y = [x * 2]"));
    }

    #[test]
    fn test_diagnostics_before_payload() {
        let fake = FakeExecutor::replying("[1,2,3]\n{\"y\": \"real\"}\n");
        let bridge = RecipeBridge::with_executor(&fake);
        let mut values = sample_values();

        bridge.execute("y = x", &mut values, &["y"]).unwrap();

        assert_eq!(values["y"], json!("real"));
    }

    #[test]
    fn test_non_zero_exit_carries_stderr() {
        let fake = FakeExecutor::failing(1, "Traceback: ZeroDivisionError");
        let bridge = RecipeBridge::with_executor(&fake);
        let mut values = sample_values();

        let err = bridge.execute("y = [x / 0]", &mut values, &["y"]).unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::Execution);
        assert!(err.stderr().unwrap().contains("ZeroDivisionError"));
        assert_eq!(values, sample_values());
    }

    #[test]
    fn test_missing_output_leaves_values() {
        let fake = FakeExecutor::replying("just chatter\n");
        let bridge = RecipeBridge::with_executor(&fake);
        let mut values = sample_values();

        let err = bridge.execute("y = x", &mut values, &["y"]).unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::Extraction);
        assert_eq!(values, sample_values());
    }

    #[test]
    fn test_render_does_not_execute() {
        let fake = FakeExecutor::replying("");
        let bridge = RecipeBridge::with_executor(&fake);

        let program = bridge
            .render("    y = [x * 2]", &sample_values(), &["y"])
            .unwrap();

        assert!(program.starts_with("import builtins as _pyway_builtins\n"));
        assert!(program.contains("\ny = [x * 2]\n"));
        assert_eq!(fake.calls.get(), 0);
    }

    #[test]
    fn test_check_order() {
        // Unknown mutable key is reported before unused values
        let values: ValueSet = [("a".to_string(), json!(1))].into_iter().collect();
        let err = check("pass", &values, &["b"]).unwrap_err();
        assert!(matches!(err, Error::UnknownMutableKey(_)));
    }
}
