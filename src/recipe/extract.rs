// src/recipe/extract.rs

//! Recovering mutated values from recipe stdout
//!
//! The recipe may print whatever it likes before the emission line, so the
//! payload is the *last* line that looks like a JSON array or object.

use crate::error::{Error, Result};
use crate::ValueSet;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};

static STRUCTURED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[\[{].*[\]}]\s*$").unwrap());

/// Find the last structured-data line in the captured stdout
pub fn extract_payload(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .rev()
        .find(|line| STRUCTURED_LINE.is_match(line))
        .map(str::trim)
}

/// Decode a payload into a JSON object
pub fn decode_payload(payload: &str) -> Result<Map<String, Value>> {
    Ok(serde_json::from_str(payload)?)
}

/// Extract, decode and merge recipe output into `values`
///
/// Names in `mutable` missing from the decoded object are left untouched.
/// `values` is only modified once the payload has decoded successfully.
pub fn merge_output<S: AsRef<str>>(
    stdout: &str,
    values: &mut ValueSet,
    mutable: &[S],
) -> Result<()> {
    let payload = extract_payload(stdout).ok_or(Error::MissingOutput)?;
    let mut decoded = decode_payload(payload)?;

    for name in mutable {
        let name = name.as_ref();
        match decoded.remove(name) {
            Some(value) => {
                debug!("Merging updated value for '{}'", name);
                values.insert(name.to_string(), value);
            }
            None => warn!("Recipe output has no entry for mutable key '{}'", name),
        }
    }

    Ok(())
}
