//! # Rule Model
//!
//! A [`Rule`] maps one subtree of the upstream checkout onto the local fork.
//! Rules are values: they are never edited in place, only replaced by
//! derived copies, and two rules are equal exactly when every field is
//! equal. The collapser relies on that to track which rules have already
//! been emitted.
//!
//! The persisted form (see [`crate::config`]) omits every field that holds
//! its default, so the in-memory representation is normalised on
//! construction:
//!
//! - `source` and `destination` use the canonical spelling from
//!   [`crate::path::normalize`];
//! - a destination equal to the source is stored as `None`;
//! - `include` is never empty in practice and defaults to `["*"]`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::{normalize, rel_path};
use crate::patterns::legacy_include_patterns;
use crate::suggestions::unknown_action_hint;

/// Pattern meaning "every file directly in the directory".
pub const WILDCARD: &str = "*";

/// Rules keyed by their source path, iterated in path order.
pub type RuleMap = BTreeMap<PathBuf, Rule>;

/// What to do with a mapped subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Keep the destination in step with the source.
    #[default]
    Sync,
    /// Copy matching files into the destination.
    Copy,
    /// Leave the subtree unmanaged.
    Skip,
}

impl Action {
    pub fn is_sync(&self) -> bool {
        matches!(self, Action::Sync)
    }

    /// Parse a legacy CSV action column; empty means `sync`.
    pub fn from_legacy(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "sync" => Some(Action::Sync),
            "copy" => Some(Action::Copy),
            "skip" => Some(Action::Skip),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Sync => "sync",
            Action::Copy => "copy",
            Action::Skip => "skip",
        };
        f.write_str(name)
    }
}

/// One mapping instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RuleRecord", into = "RuleRecord")]
pub struct Rule {
    /// Source path relative to the upstream root, `"."` for the root.
    pub source: String,
    /// Destination relative to the local root when it differs from `source`.
    pub destination: Option<String>,
    pub action: Action,
    /// Glob patterns selecting files, relative to `source`.
    pub include: Vec<String>,
    /// Glob patterns removing files from the selection.
    pub exclude: Vec<String>,
}

impl Rule {
    /// A `sync` rule copying every file directly under `source`.
    pub fn new(source: &str) -> Self {
        Self {
            source: normalize(source),
            destination: None,
            action: Action::Sync,
            include: vec![WILDCARD.to_string()],
            exclude: Vec::new(),
        }
    }

    pub fn with_destination(mut self, destination: &str) -> Self {
        let destination = normalize(destination);
        self.destination = (destination != self.source).then_some(destination);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Replace the include patterns; an empty list falls back to `["*"]`.
    pub fn with_include<S: Into<String>>(mut self, include: impl IntoIterator<Item = S>) -> Self {
        self.include = include.into_iter().map(Into::into).collect();
        if self.include.is_empty() {
            self.include.push(WILDCARD.to_string());
        }
        self
    }

    pub fn with_exclude<S: Into<String>>(mut self, exclude: impl IntoIterator<Item = S>) -> Self {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    /// Effective destination, which is the source unless overridden.
    pub fn destination(&self) -> &str {
        self.destination.as_deref().unwrap_or(&self.source)
    }

    pub fn source_path(&self) -> PathBuf {
        rel_path(&self.source)
    }

    pub fn destination_path(&self) -> PathBuf {
        rel_path(self.destination())
    }

    pub fn has_default_include(&self) -> bool {
        self.include.len() == 1 && self.include[0] == WILDCARD
    }

    /// Whether every include pattern contains a wildcard.
    pub fn is_glob_only(&self) -> bool {
        self.include.iter().all(|pattern| pattern.contains('*'))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.source, self.destination())
    }
}

/// Accepts either a single pattern or a list of patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    fn into_vec(self) -> Vec<String> {
        match self {
            Patterns::One(pattern) => vec![pattern],
            Patterns::Many(patterns) => patterns,
        }
    }
}

/// The minimal persisted shape of a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleRecord {
    source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    destination: Option<String>,
    #[serde(default, skip_serializing_if = "Action::is_sync")]
    action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    include: Option<Patterns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exclude: Option<Patterns>,
}

impl From<RuleRecord> for Rule {
    fn from(record: RuleRecord) -> Self {
        let mut rule = Rule::new(&record.source).with_action(record.action);
        if let Some(destination) = record.destination {
            rule = rule.with_destination(&destination);
        }
        if let Some(include) = record.include {
            rule = rule.with_include(include.into_vec());
        }
        if let Some(exclude) = record.exclude {
            rule = rule.with_exclude(exclude.into_vec());
        }
        rule
    }
}

impl From<Rule> for RuleRecord {
    fn from(rule: Rule) -> Self {
        let include = (!rule.has_default_include()).then(|| Patterns::Many(rule.include));
        let exclude = (!rule.exclude.is_empty()).then(|| Patterns::Many(rule.exclude));
        RuleRecord {
            source: rule.source,
            destination: rule.destination,
            action: rule.action,
            include,
            exclude,
        }
    }
}

/// A row of the legacy four-column mapping file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRow {
    pub old: String,
    pub new: String,
    pub action: String,
    pub ext2keep: String,
}

/// What a single legacy row turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyEntry {
    Rule(Rule),
    /// The directory is explicitly unmanaged.
    SkipDirectory(PathBuf),
}

impl LegacyRow {
    /// Convert this row into a rule or a skip marker.
    ///
    /// `skip` rows and rows without an `ext2keep` value become skip markers.
    /// Suspicious tokens are appended to `warnings`.
    pub fn to_entry(&self, warnings: &mut Vec<String>) -> Result<LegacyEntry> {
        let action = Action::from_legacy(&self.action).ok_or_else(|| Error::ConfigParse {
            message: format!("unknown action '{}' for '{}'", self.action, self.old),
            hint: Some(unknown_action_hint(&self.action)),
        })?;

        if action == Action::Skip || self.ext2keep.trim().is_empty() {
            return Ok(LegacyEntry::SkipDirectory(rel_path(&self.old)));
        }

        let patterns = legacy_include_patterns(&self.ext2keep)?;
        warnings.extend(
            patterns
                .warnings
                .into_iter()
                .map(|warning| format!("{} ({})", warning, self.old)),
        );

        Ok(LegacyEntry::Rule(
            Rule::new(&self.old)
                .with_destination(&self.new)
                .with_action(action)
                .with_include(patterns.include),
        ))
    }
}

/// Result of converting a whole legacy file.
#[derive(Debug, Clone, Default)]
pub struct LegacyConversion {
    pub rules: Vec<Rule>,
    pub skip_directories: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Convert legacy rows into rules and skip markers.
///
/// Rows sharing an `old` path collapse to the last one; a conflicting
/// duplicate is reported as a warning.
pub fn convert_legacy_rows(rows: &[LegacyRow]) -> Result<LegacyConversion> {
    let mut conversion = LegacyConversion::default();
    let mut by_source: RuleMap = BTreeMap::new();

    for row in rows {
        match row.to_entry(&mut conversion.warnings)? {
            LegacyEntry::Rule(rule) => {
                let key = rule.source_path();
                if let Some(previous) = by_source.insert(key, rule.clone()) {
                    if previous != rule {
                        conversion.warnings.push(format!(
                            "Duplicate rule for '{}', keeping the last one",
                            rule.source
                        ));
                    }
                }
            }
            LegacyEntry::SkipDirectory(path) => {
                if !conversion.skip_directories.contains(&path) {
                    conversion.skip_directories.push(path);
                }
            }
        }
    }

    conversion.rules = by_source.into_values().collect();
    Ok(conversion)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(old: &str, new: &str, action: &str, ext2keep: &str) -> LegacyRow {
        LegacyRow {
            old: old.to_string(),
            new: new.to_string(),
            action: action.to_string(),
            ext2keep: ext2keep.to_string(),
        }
    }

    #[test]
    fn test_rule_defaults() {
        let rule = Rule::new("./src/core/");
        assert_eq!(rule.source, "src/core");
        assert_eq!(rule.destination(), "src/core");
        assert_eq!(rule.action, Action::Sync);
        assert_eq!(rule.include, vec!["*"]);
        assert!(rule.exclude.is_empty());
    }

    #[test]
    fn test_destination_equal_to_source_is_dropped() {
        let rule = Rule::new("src").with_destination("src/");
        assert_eq!(rule.destination, None);
        let moved = Rule::new("src").with_destination("lib");
        assert_eq!(moved.destination.as_deref(), Some("lib"));
    }

    #[test]
    fn test_rule_equality_is_structural() {
        let a = Rule::new("src").with_include(["*.cpp"]);
        let b = Rule::new("src").with_include(["*.cpp"]);
        let c = Rule::new("src").with_include(["*.h"]);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: std::collections::HashSet<Rule> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_is_glob_only() {
        assert!(Rule::new("a").with_include(["*.h", "**/*.cpp"]).is_glob_only());
        assert!(!Rule::new("a").with_include(["*.h", "Makefile"]).is_glob_only());
    }

    #[test]
    fn test_action_from_legacy() {
        assert_eq!(Action::from_legacy(""), Some(Action::Sync));
        assert_eq!(Action::from_legacy("Copy"), Some(Action::Copy));
        assert_eq!(Action::from_legacy("skip"), Some(Action::Skip));
        assert_eq!(Action::from_legacy("move"), None);
    }

    #[test]
    fn test_legacy_row_wildcard_round_trip() {
        let mut warnings = Vec::new();
        let entry = row("src", "src", "", "*").to_entry(&mut warnings).unwrap();
        let LegacyEntry::Rule(rule) = entry else {
            panic!("expected a rule");
        };
        assert_eq!(rule.include, vec!["*"]);

        let yaml = serde_yaml::to_string(&rule).unwrap();
        assert!(!yaml.contains("include"));
        assert!(!yaml.contains("destination"));
        assert!(!yaml.contains("action"));
    }

    #[test]
    fn test_legacy_row_skip_markers() {
        let mut warnings = Vec::new();
        assert_eq!(
            row("docs", "docs", "skip", "*").to_entry(&mut warnings).unwrap(),
            LegacyEntry::SkipDirectory(PathBuf::from("docs"))
        );
        assert_eq!(
            row("tests", "tests", "sync", "").to_entry(&mut warnings).unwrap(),
            LegacyEntry::SkipDirectory(PathBuf::from("tests"))
        );
    }

    #[test]
    fn test_legacy_row_unknown_action() {
        let mut warnings = Vec::new();
        let error = row("src", "src", "cpoy", "*").to_entry(&mut warnings).unwrap_err();
        assert!(error.to_string().contains("Did you mean 'copy'?"));
    }

    #[test]
    fn test_convert_legacy_rows() {
        let rows = vec![
            row(".", ".", "", "txt"),
            row("src/core", "core", "copy", "h,cpp"),
            row("docs", "docs", "skip", ""),
            row("src/core", "core", "copy", "h,cpp"),
        ];
        let conversion = convert_legacy_rows(&rows).unwrap();
        assert_eq!(conversion.rules.len(), 2);
        assert!(conversion.warnings.is_empty());
        assert_eq!(conversion.skip_directories, vec![PathBuf::from("docs")]);

        let core = &conversion.rules[1];
        assert_eq!(core.source, "src/core");
        assert_eq!(core.destination(), "core");
        assert_eq!(core.action, Action::Copy);
        assert_eq!(core.include, vec!["*.cpp", "*.h"]);
    }

    #[test]
    fn test_convert_legacy_rows_reports_conflicting_duplicates() {
        let rows = vec![row("src", "src", "", "h"), row("src", "src", "", "cpp")];
        let conversion = convert_legacy_rows(&rows).unwrap();
        assert_eq!(conversion.rules.len(), 1);
        assert_eq!(conversion.rules[0].include, vec!["*.cpp"]);
        assert_eq!(conversion.warnings.len(), 1);
    }

    #[test]
    fn test_deserialize_single_include_string() {
        let rule: Rule = serde_yaml::from_str("source: src\ninclude: '*.h'\n").unwrap();
        assert_eq!(rule.include, vec!["*.h"]);
    }
}
