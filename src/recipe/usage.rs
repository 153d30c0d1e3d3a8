// src/recipe/usage.rs

//! Detecting which declared values a recipe actually reads
//!
//! This is a lexical heuristic, not a parser. String literals and comments are
//! stripped from the recipe (the "semantic residue"), then each name is looked
//! up as a whole word. Names hidden inside f-string expressions are missed,
//! and unusual quoting can leave inert text behind; both are tolerated.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Patterns applied in order. Triple-quoted blocks go first so their quotes
/// are not consumed as empty single-quoted strings.
static STRIP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#""""[\s\S]*?""""#,
        r"'''[\s\S]*?'''",
        r#""([^"\\]|\\.)*""#,
        r"'([^'\\]|\\.)*'",
        r"(?m)#.*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static strip pattern"))
    .collect()
});

/// Remove string literals and comments, leaving only code tokens
pub fn semantic_residue(source: &str) -> String {
    let mut residue = source.to_string();
    for re in STRIP_PATTERNS.iter() {
        residue = re.replace_all(&residue, "").into_owned();
    }
    residue
}

/// Check whether `name` appears as a whole word in the recipe's code
pub fn is_used(source: &str, name: &str) -> bool {
    uses(&semantic_residue(source), name)
}

fn uses(residue: &str, name: &str) -> bool {
    let pattern = format!(r"\b{}\b", regex::escape(name));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(residue),
        Err(_) => false,
    }
}

/// Names from `names` that the recipe never references, sorted
pub fn verify_usage<I, S>(source: &str, names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let residue = semantic_residue(source);

    let mut unused: Vec<String> = names
        .into_iter()
        .filter(|name| !uses(&residue, name.as_ref()))
        .map(|name| name.as_ref().to_string())
        .collect();
    unused.sort();

    debug!("Usage check: {} unused name(s)", unused.len());
    unused
}
