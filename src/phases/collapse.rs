//! Phase 4: Rule Collapsing
//!
//! Folds per-directory rules into fewer recursive rules without changing the
//! set of files a mapping run copies.
//!
//! Rules are visited in source-path order, so an ancestor is always
//! classified before its descendants. Each rule is checked against every
//! directory below it in the upstream tree:
//!
//! - [`CollapseKind::Collapsible`]: every descendant has a rule with the same
//!   include set. The parent's patterns become `**/`-recursive and the
//!   descendant rules disappear.
//! - [`CollapseKind::CollapsibleWithExclude`]: same as above, but some
//!   descendants have no rule. They are folded into exclude globs.
//! - [`CollapseKind::CollapsibleWithSplit`]: every descendant has a rule and
//!   they share some include patterns. The shared patterns move to the parent
//!   as recursive patterns and each descendant keeps only what remains.
//! - [`CollapseKind::NotCollapsible`]: the rule is emitted verbatim.
//!
//! A descendant whose destination does not mirror its source relative to the
//! parent makes the parent non-collapsible and is reported as suspicious.
//!
//! Before collapsing, directories that only group ruled children receive a
//! provisional rule (see [`promote_containers`]). Provisional rules survive
//! only when they actually collapse something.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use log::debug;

use super::scan::{descendants_in, DirTree};
use crate::path::{is_root, parent_of, relative_to, to_posix};
use crate::rule::{Action, Rule, RuleMap};

const RECURSIVE_PREFIX: &str = "**/";

/// Collapse verdict for one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapseKind {
    NotCollapsible,
    Collapsible,
    CollapsibleWithExclude,
    CollapsibleWithSplit,
}

/// Result of collapsing a rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseOutcome {
    /// Collapsed rules ordered by source path.
    pub rules: Vec<Rule>,
    /// Rules whose destination does not mirror their parent, each listed once.
    pub suspicious: Vec<Rule>,
    /// Sources of provisional container rules that made it into `rules`.
    pub promoted: Vec<String>,
}

/// Execute Phase 4: collapse `rules` against the upstream directory tree.
pub fn collapse_rules(rules: &RuleMap, upstream: &DirTree) -> CollapseOutcome {
    let provisional = promote_containers(rules, upstream);
    let provisional_sources: BTreeSet<PathBuf> = provisional.keys().cloned().collect();

    let mut all_rules = rules.clone();
    all_rules.extend(provisional);

    let mut collapser = Collapser {
        rules: &all_rules,
        tree: upstream,
        provisional: &provisional_sources,
        consumed: HashSet::new(),
        suspicious: BTreeMap::new(),
    };

    let mut outcome = CollapseOutcome::default();
    for (path, rule) in &all_rules {
        let emitted = collapser.collapse(path, rule);
        if provisional_sources.contains(path) && !emitted.is_empty() {
            outcome.promoted.push(rule.source.clone());
        }
        outcome.rules.extend(emitted);
    }

    outcome
        .rules
        .sort_by(|a, b| a.source_path().cmp(&b.source_path()));
    outcome.suspicious = collapser.suspicious.into_values().collect();

    debug!(
        "Collapsed {} rules into {} ({} provisional kept)",
        rules.len(),
        outcome.rules.len(),
        outcome.promoted.len()
    );
    outcome
}

struct Collapser<'a> {
    rules: &'a RuleMap,
    tree: &'a DirTree,
    provisional: &'a BTreeSet<PathBuf>,
    consumed: HashSet<Rule>,
    suspicious: BTreeMap<String, Rule>,
}

impl Collapser<'_> {
    fn collapse(&mut self, path: &Path, rule: &Rule) -> Vec<Rule> {
        if self.consumed.contains(rule) {
            return Vec::new();
        }

        let subpaths = self.tree.descendants(path);
        let is_provisional = self.provisional.contains(path);
        let kind = self.classify(path, rule, &subpaths);
        debug!("{}: {:?}", rule.source, kind);

        match kind {
            CollapseKind::NotCollapsible => {
                if is_provisional {
                    return Vec::new();
                }
                self.consumed.insert(rule.clone());
                vec![rule.clone()]
            }
            CollapseKind::Collapsible | CollapseKind::CollapsibleWithExclude => {
                let include: Vec<String> = rule.include.iter().map(|p| recursive(p)).collect();
                let mut exclude = rule.exclude.clone();
                if kind == CollapseKind::CollapsibleWithExclude {
                    let uncovered: Vec<PathBuf> = subpaths
                        .iter()
                        .filter(|subpath| !self.rules.contains_key(*subpath))
                        .cloned()
                        .collect();
                    for pattern in exclude_patterns(path, &uncovered, self.tree) {
                        if !exclude.contains(&pattern) {
                            exclude.push(pattern);
                        }
                    }
                }

                self.consumed.insert(rule.clone());
                for subpath in &subpaths {
                    if let Some(child) = self.rules.get(subpath) {
                        self.consumed.insert(child.clone());
                    }
                }
                vec![rule.clone().with_include(include).with_exclude(exclude)]
            }
            CollapseKind::CollapsibleWithSplit => self.split(rule, &subpaths, is_provisional),
        }
    }

    fn classify(&mut self, path: &Path, rule: &Rule, subpaths: &BTreeSet<PathBuf>) -> CollapseKind {
        if is_root(path) || subpaths.is_empty() {
            return CollapseKind::NotCollapsible;
        }

        let source_root = rule.source_path();
        let destination_root = rule.destination_path();
        let parent_include: BTreeSet<&String> = rule.include.iter().collect();

        let mut all_ruled = true;
        let mut all_same = true;
        let mut uniform = true;
        let mut structural = true;

        for subpath in subpaths {
            let Some(child) = self.rules.get(subpath) else {
                all_ruled = false;
                continue;
            };

            if !mirrors_parent(child, &source_root, &destination_root) {
                structural = false;
                if !self.provisional.contains(subpath) {
                    self.suspicious
                        .entry(child.source.clone())
                        .or_insert_with(|| child.clone());
                }
            }

            let child_include: BTreeSet<&String> = child.include.iter().collect();
            if child_include != parent_include {
                all_same = false;
            }
            if child.action != rule.action || !child.exclude.is_empty() {
                uniform = false;
            }
        }

        if !structural || !uniform {
            return CollapseKind::NotCollapsible;
        }

        if all_same {
            if all_ruled {
                return CollapseKind::Collapsible;
            }
            if rule.is_glob_only() {
                return CollapseKind::CollapsibleWithExclude;
            }
        } else if all_ruled && !self.common_include(rule, subpaths).is_empty() {
            return CollapseKind::CollapsibleWithSplit;
        }

        CollapseKind::NotCollapsible
    }

    /// Include patterns shared by `rule` and every ruled descendant.
    fn common_include(&self, rule: &Rule, subpaths: &BTreeSet<PathBuf>) -> BTreeSet<String> {
        let mut common: BTreeSet<String> = rule.include.iter().cloned().collect();
        for child in subpaths.iter().filter_map(|subpath| self.rules.get(subpath)) {
            common.retain(|pattern| child.include.contains(pattern));
        }
        common
    }

    fn split(
        &mut self,
        rule: &Rule,
        subpaths: &BTreeSet<PathBuf>,
        is_provisional: bool,
    ) -> Vec<Rule> {
        let common = self.common_include(rule, subpaths);

        // A provisional parent owns no files of its own upstream.
        let mut include: Vec<String> = if is_provisional {
            Vec::new()
        } else {
            rule.include
                .iter()
                .filter(|pattern| !common.contains(*pattern))
                .cloned()
                .collect()
        };
        include.extend(common.iter().map(|pattern| recursive(pattern)));

        self.consumed.insert(rule.clone());
        let mut emitted = vec![rule.clone().with_include(include)];

        for subpath in subpaths {
            let Some(child) = self.rules.get(subpath) else {
                continue;
            };
            self.consumed.insert(child.clone());
            if self.provisional.contains(subpath) {
                continue;
            }

            let mut remaining: Vec<String> = child
                .include
                .iter()
                .filter(|pattern| !common.contains(*pattern))
                .cloned()
                .collect();
            if remaining.is_empty() {
                continue;
            }
            remaining.sort();
            emitted.push(child.clone().with_include(remaining));
        }

        emitted
    }
}

fn recursive(pattern: &str) -> String {
    if pattern.starts_with(RECURSIVE_PREFIX) {
        pattern.to_string()
    } else {
        format!("{RECURSIVE_PREFIX}{pattern}")
    }
}

/// Whether `child` sits at the same relative place under the parent's
/// destination as it does under the parent's source.
fn mirrors_parent(child: &Rule, source_root: &Path, destination_root: &Path) -> bool {
    let source_rel = relative_to(&child.source_path(), source_root);
    let destination_rel = relative_to(&child.destination_path(), destination_root);
    match (source_rel, destination_rel) {
        (Some(source_rel), Some(destination_rel)) => source_rel == destination_rel,
        _ => false,
    }
}

/// Exclude globs, relative to `source`, covering the `uncovered` directories.
///
/// A directory whose whole upstream subtree is uncovered becomes
/// `dir/**/*`; any other uncovered directory only loses its own files with
/// `dir/*`. The result is sorted.
pub fn exclude_patterns(source: &Path, uncovered: &[PathBuf], tree: &DirTree) -> Vec<String> {
    let uncovered_set: BTreeSet<PathBuf> = uncovered.iter().cloned().collect();

    let mut uncovered_children: BTreeMap<PathBuf, BTreeSet<PathBuf>> = BTreeMap::new();
    for dir in uncovered {
        uncovered_children.entry(dir.clone()).or_default();
        let parent = parent_of(dir);
        if uncovered_set.contains(&parent) {
            uncovered_children
                .entry(parent)
                .or_default()
                .insert(dir.clone());
        }
    }

    let mut processed = BTreeSet::new();
    let mut patterns = BTreeSet::new();
    for (dir, children) in &uncovered_children {
        if !processed.insert(dir.clone()) {
            continue;
        }

        let rel = relative_to(dir, source)
            .map(|rel| to_posix(&rel))
            .unwrap_or_else(|| to_posix(dir));

        if children.is_empty() {
            patterns.insert(format!("{rel}/*"));
            continue;
        }

        let excluded = descendants_in(&uncovered_children, dir);
        if tree.descendants(dir) == excluded {
            patterns.insert(format!("{rel}/**/*"));
            processed.extend(excluded);
        } else {
            patterns.insert(format!("{rel}/*"));
        }
    }

    patterns.into_iter().collect()
}

/// Provisional rules for directories that only group ruled children.
///
/// A non-root directory qualifies when it has no rule and no files of its
/// own upstream, and every immediate child has a rule with the same action,
/// the same include set, no excludes, and a destination that keeps the
/// child's name under one shared parent. The provisional rule maps the
/// directory onto that shared parent. Directories are visited deepest first
/// so promotion cascades upward.
pub fn promote_containers(rules: &RuleMap, tree: &DirTree) -> RuleMap {
    let mut promoted = RuleMap::new();
    let dirs: Vec<&PathBuf> = tree.dirs().collect();

    for dir in dirs.into_iter().rev() {
        if is_root(dir) || rules.contains_key(dir) || tree.has_files(dir) {
            continue;
        }

        let children: Option<Vec<&Rule>> = tree
            .children(dir)
            .map(|child| rules.get(child).or_else(|| promoted.get(child)))
            .collect();
        let Some(children) = children else {
            continue;
        };

        if let Some(rule) = shared_container_rule(dir, &children) {
            debug!("Promoted container {} → {}", rule.source, rule.destination());
            promoted.insert(dir.clone(), rule);
        }
    }

    promoted
}

fn shared_container_rule(dir: &Path, children: &[&Rule]) -> Option<Rule> {
    let first = children.first()?;
    if first.action == Action::Skip {
        return None;
    }

    let include: BTreeSet<&String> = first.include.iter().collect();
    let destination_parent = parent_of(&first.destination_path());

    for child in children {
        let child_include: BTreeSet<&String> = child.include.iter().collect();
        if child.action != first.action || !child.exclude.is_empty() || child_include != include {
            return None;
        }
        let destination = child.destination_path();
        if parent_of(&destination) != destination_parent
            || destination.file_name() != child.source_path().file_name()
        {
            return None;
        }
    }

    Some(
        Rule::new(&to_posix(dir))
            .with_destination(&to_posix(&destination_parent))
            .with_action(first.action)
            .with_include(first.include.clone()),
    )
}
