// src/recipe/assemble.rs

//! Building the program handed to the interpreter
//!
//! Layout of the generated program:
//!
//! ```text
//! import builtins as _pyway_builtins
//! import json as _pyway_json
//! <name> = <literal>        one per value, sorted by name
//!
//! <recipe body>
//!
//! _pyway_builtins.print(_pyway_json.dumps({"<m1>": <m1>, ...}))
//! ```
//!
//! The emission line is the last statement on the success path, so its
//! output is the last structured line on stdout. It only goes through the
//! two aliases, so values or recipes that rebind `print` or `json` do not
//! break it.

use super::indent::normalize_indentation;
use super::literal::{to_python_literal, write_string};
use crate::ValueSet;

/// Alias the preamble binds the `builtins` module to
pub const BUILTINS_ALIAS: &str = "_pyway_builtins";

/// Alias the preamble binds the `json` module to
pub const JSON_ALIAS: &str = "_pyway_json";

/// Python keywords, which cannot be assigned to
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Check that a value name can be declared as a top-level Python variable
///
/// Accepts Unicode identifiers: a letter or `_`, then letters, digits, or
/// `_`. Keywords and the preamble aliases are refused. Python's identifier
/// rules are slightly narrower than Unicode's alphanumeric class (`x²` passes
/// here), and such a name fails later as a `SyntaxError` from the
/// interpreter.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_alphabetic() || c == '_');

    starts_ok
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !PYTHON_KEYWORDS.contains(&name)
        && name != BUILTINS_ALIAS
        && name != JSON_ALIAS
}

/// Assemble the full program for a recipe
///
/// Names are assumed to be validated already.
pub fn assemble<S: AsRef<str>>(recipe: &str, values: &ValueSet, mutable: &[S]) -> String {
    let mut script = String::new();

    script.push_str(&format!("import builtins as {}\n", BUILTINS_ALIAS));
    script.push_str(&format!("import json as {}\n", JSON_ALIAS));

    let mut names: Vec<&String> = values.keys().collect();
    names.sort();
    for name in names {
        script.push_str(name);
        script.push_str(" = ");
        script.push_str(&to_python_literal(&values[name]));
        script.push('\n');
    }

    script.push('\n');
    script.push_str(&normalize_indentation(recipe));
    script.push_str("\n\n");
    script.push_str(&emission(mutable));
    script.push('\n');

    script
}

/// The statement printing the mutable bindings as one JSON object
fn emission<S: AsRef<str>>(mutable: &[S]) -> String {
    let mut line = format!("{}.print({}.dumps({{", BUILTINS_ALIAS, JSON_ALIAS);
    for (i, name) in mutable.iter().enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        write_string(&mut line, name.as_ref());
        line.push_str(": ");
        line.push_str(name.as_ref());
    }
    line.push_str("}))");
    line
}
