// src/recipe/literal.rs

//! Rendering host values as Python literals
//!
//! JSON text is almost a Python literal already: numbers, strings, lists and
//! dicts read the same. Only the three keywords differ (`null`, `true`,
//! `false`), so containers are walked recursively instead of being dumped
//! verbatim.

use serde_json::Value;
use std::fmt::Write as _;

/// Render a value as Python source text
pub fn to_python_literal(value: &Value) -> String {
    let mut out = String::new();
    write_literal(&mut out, value);
    out
}

fn write_literal(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        // serde_json never holds NaN/inf, so this is always a valid Python number
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_string(out, key);
                out.push_str(": ");
                write_literal(out, item);
            }
            out.push('}');
        }
    }
}

/// JSON string escaping only produces escapes Python also understands
/// (`\"`, `\\`, `\n`, `\t`, `\uXXXX`, ...), and always double-quotes.
pub(crate) fn write_string(out: &mut String, s: &str) {
    // Serializing a &str cannot fail
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str("\"\""),
    }
}
