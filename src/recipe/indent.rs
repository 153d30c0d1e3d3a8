// src/recipe/indent.rs

//! Re-basing indented recipe blocks to column zero

/// Strip the common leading-whitespace prefix from every line
///
/// Recipes are usually written as indented string literals inside host code.
/// The smallest indentation among non-blank lines is removed from every line
/// long enough to have it; shorter (blank) lines pass through unchanged. Text
/// made only of blank lines is returned as-is.
pub fn normalize_indentation(code: &str) -> String {
    let min_indent = code
        .split('\n')
        .filter_map(|line| {
            let trimmed = line.trim_start();
            (!trimmed.is_empty()).then(|| line.len() - trimmed.len())
        })
        .min();

    match min_indent {
        Some(indent) if indent > 0 => code
            .split('\n')
            .map(|line| line.get(indent..).unwrap_or(line))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => code.to_string(),
    }
}
