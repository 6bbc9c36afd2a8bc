//! Pattern utilities for legacy `ext2keep` tokens.
//!
//! A legacy row lists what to keep in a directory as a comma-separated mix of
//! extensions (`h`, `.cpp`), literal filenames (`CMakeLists.txt`), and
//! numbered ranges (`icon[1-3].png`). These helpers turn that list into the
//! glob include patterns used by [`crate::rule::Rule`].

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Extensions recognised in legacy `ext2keep` columns.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "1", "api", "asn", "c", "cc", "cl", "cpp", "csv", "db", "frag", "geom", "gif", "gpl", "h",
    "hpp", "html", "ini", "jpg", "ll", "mm", "pap", "png", "py", "qrc", "rc", "sql", "svg", "ts",
    "txt", "ui", "vert", "xml", "xsd", "xcf", "yy",
];

/// Upper bound on the number of names one bracket range may produce.
pub const MAX_RANGE_LEN: u64 = 10_000;

/// Tokens this short that are not known extensions are treated as typos.
const SHORT_TOKEN_LEN: usize = 4;

fn bracket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^\[]*)\[([^\]]*)\](.*)$").expect("static regex"))
}

/// Expand a `prefix[a-b]suffix` token into one token per integer.
///
/// Both bounds are inclusive: `file[1-3]` yields `file1`, `file2`, `file3`.
/// A range producing more than [`MAX_RANGE_LEN`] names is rejected.
/// Tokens without a bracket pair are returned unchanged.
pub fn expand_braced_range(token: &str) -> Result<Vec<String>> {
    let Some(captures) = bracket_regex().captures(token) else {
        return Ok(vec![token.to_string()]);
    };

    let invalid = |message: &str| Error::BraceRange {
        token: token.to_string(),
        message: message.to_string(),
    };

    let (prefix, range, suffix) = (&captures[1], &captures[2], &captures[3]);
    let (start, finish) = range
        .split_once('-')
        .ok_or_else(|| invalid("expected a range like [1-3]"))?;
    let start: u64 = start
        .trim()
        .parse()
        .map_err(|_| invalid("bounds must be non-negative integers"))?;
    let finish: u64 = finish
        .trim()
        .parse()
        .map_err(|_| invalid("bounds must be non-negative integers"))?;
    if start > finish {
        return Err(invalid("lower bound exceeds upper bound"));
    }
    if finish - start >= MAX_RANGE_LEN {
        return Err(invalid(&format!("range yields more than {MAX_RANGE_LEN} names")));
    }

    Ok((start..=finish)
        .map(|i| format!("{prefix}{i}{suffix}"))
        .collect())
}

/// Classify a token as a file extension or a literal filename.
///
/// The comparison ignores case and a leading dot. A short unknown token is
/// rejected with [`Error::SuspiciousExtension`] because it is far more
/// likely a misspelled extension than a real filename.
pub fn is_extension(pattern: &str) -> Result<bool> {
    let lowered = pattern.to_lowercase();
    let candidate = lowered.trim_start_matches('.');
    if KNOWN_EXTENSIONS.contains(&candidate) {
        return Ok(true);
    }
    if pattern.chars().count() <= SHORT_TOKEN_LEN {
        return Err(Error::SuspiciousExtension {
            token: pattern.to_string(),
        });
    }
    Ok(false)
}

/// Include patterns derived from a legacy `ext2keep` column.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LegacyPatterns {
    /// Sorted glob patterns.
    pub include: Vec<String>,
    /// Tokens that were kept as literals after failing classification.
    pub warnings: Vec<String>,
}

/// Convert an `ext2keep` column into sorted include patterns.
///
/// `"*"` maps to the wildcard. Otherwise every comma-separated token is
/// bracket-expanded; extensions become `*.ext` and everything else is kept
/// verbatim. A token rejected by [`is_extension`] is kept as a literal and
/// reported in [`LegacyPatterns::warnings`].
pub fn legacy_include_patterns(ext2keep: &str) -> Result<LegacyPatterns> {
    let ext2keep = ext2keep.trim();
    if ext2keep == "*" {
        return Ok(LegacyPatterns {
            include: vec!["*".to_string()],
            warnings: Vec::new(),
        });
    }

    let mut patterns = LegacyPatterns::default();
    for token in ext2keep.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        for expanded in expand_braced_range(token)? {
            let pattern = match is_extension(&expanded) {
                Ok(true) => format!("*.{}", expanded.trim_start_matches('.')),
                Ok(false) => expanded,
                Err(error) => {
                    patterns.warnings.push(error.to_string());
                    expanded
                }
            };
            if !patterns.include.contains(&pattern) {
                patterns.include.push(pattern);
            }
        }
    }
    patterns.include.sort();
    Ok(patterns)
}
