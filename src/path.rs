//! Relative path and glob helpers shared by the pipeline phases.
//!
//! Rule sources and destinations are relative, `/`-separated paths where the
//! tree root is spelled `"."`. `std::path` spells the root's parent as an
//! empty path, so every place that walks up or strips prefixes goes through
//! these helpers instead.

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::Result;

/// The spelling of the tree root in rules and snapshots.
pub const ROOT: &str = ".";

/// Glob options used for include/exclude evaluation: `*` never crosses a
/// directory separator, `**/` spans any number of directories.
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Normalize a user-supplied relative path to its canonical rule spelling.
///
/// Backslashes become `/`, empty and `.` components are dropped, and an
/// empty result is the root `"."`.
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let parts: Vec<&str> = unified
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    if parts.is_empty() {
        ROOT.to_string()
    } else {
        parts.join("/")
    }
}

/// Canonical relative path for a rule source or destination string.
pub fn rel_path(raw: &str) -> PathBuf {
    PathBuf::from(normalize(raw))
}

/// Render a relative path with `/` separators, `"."` for the root.
pub fn to_posix(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        ROOT.to_string()
    } else {
        parts.join("/")
    }
}

/// Whether a relative path denotes the tree root.
pub fn is_root(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::CurDir))
}

/// Parent of a relative path, `"."` for top-level entries.
pub fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from(ROOT),
    }
}

/// `path` relative to `base`, treating `"."` as the root of both.
///
/// Returns `None` when `path` is not inside `base`.
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let stripped = if is_root(base) {
        path.to_path_buf()
    } else {
        path.strip_prefix(base).ok()?.to_path_buf()
    };
    Some(PathBuf::from(to_posix(&stripped)))
}

/// Resolve a relative rule path against an absolute tree root.
pub fn join_rel(root: &Path, rel: &Path) -> PathBuf {
    if is_root(rel) {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

/// A compiled list of include or exclude globs evaluated against paths
/// relative to a rule's source directory.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile every pattern, failing on the first invalid one.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| Pattern::new(pattern.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether any pattern matches the relative path.
    pub fn matches(&self, rel: &Path) -> bool {
        let candidate = to_posix(rel);
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(&candidate, MATCH_OPTIONS))
    }

    /// Whether any pattern can reach below the top directory.
    pub fn is_recursive(&self) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.as_str().contains('/'))
    }
}
