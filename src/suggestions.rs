//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Mapping file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::mapping_not_found(dir));
//! ```

use std::path::Path;

/// Actions accepted by rule files.
pub const VALID_ACTIONS: &[&str] = &["sync", "copy", "skip"];

/// Generate an error for when no mapping file exists.
///
/// Includes hints about:
/// - Pointing at a file with --mapping-file
/// - Using the BORSCH_MAPPING_FILE environment variable
/// - Creating one from the legacy list with `migrate`
pub fn mapping_not_found(dir: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Mapping file not found in {dir}\n\n\
         hint: Use --mapping-file to specify a different path\n\
         hint: Set BORSCH_MAPPING_FILE environment variable\n\
         hint: Run 'organizer migrate' to create mapping.yaml from folders.csv",
        dir = dir.display()
    )
}

/// Generate an error for when the legacy CSV file is missing.
pub fn legacy_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Legacy file {path} not found\n\n\
         hint: Use --legacy-file to specify a different path",
        path = path.display()
    )
}

/// Generate an error for a tree root that is not a directory.
///
/// `kind` is `local` or `upstream` and names both the flag and the
/// environment variable to use.
pub fn root_not_found(kind: &str, path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "The {kind} tree {path} is not a directory\n\n\
         hint: Use --{kind} to specify a different path\n\
         hint: Set BORSCH_{env} environment variable",
        path = path.display(),
        env = kind.to_uppercase()
    )
}

/// Generate an error for an invalid glob pattern in a rule.
///
/// Includes hints about glob syntax.
pub fn invalid_glob(source: &str, pattern: &str, error: &glob::PatternError) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid glob pattern in rule '{source}': {pattern}\n\
         error: {error}\n\n\
         hint: Use * within one directory, **/ to match any number of directories\n\
         hint: Use [abc] for character classes, [!abc] to negate"
    )
}

/// Hint text for an unknown rule action, suggesting the closest valid one.
pub fn unknown_action_hint(action: &str) -> String {
    let did_you_mean = find_similar(&action.to_lowercase(), VALID_ACTIONS)
        .map(|s| format!("Did you mean '{s}'? "))
        .unwrap_or_default();
    format!("{did_you_mean}Valid actions are: {}", VALID_ACTIONS.join(", "))
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single rolling row of the distance matrix
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, a_char) in a_chars.iter().enumerate() {
        let mut current = vec![i + 1; b_chars.len() + 1];
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }

    previous[b_chars.len()]
}
