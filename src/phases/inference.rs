//! Phase 2: Rule Inference
//!
//! Fills gaps in a rule set. A directory that exists in both trees, has no
//! rule, is not explicitly skipped, and holds files on the local side gets a
//! synthesized `sync` rule. Its include patterns come from the extension
//! profile of the local directory:
//!
//! - identical, non-empty extension sets on both sides → `*`;
//! - otherwise one `*.ext` per local extension, in sorted order.
//!
//! Existing rules are never touched, so running the phase again on the
//! enriched rule set finds nothing new.
//!
//! This module also hosts the outdated-rule check, which compares rule
//! sources against both trees on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::debug;

use super::scan::DirTree;
use super::RootPaths;
use crate::defaults::NOISE_DIRS;
use crate::path::{join_rel, to_posix};
use crate::rule::{Rule, RuleMap, WILDCARD};

/// Execute Phase 2: synthesize rules for unlisted common directories.
///
/// Returned rules are ordered by source path.
pub fn find_missed_rules(
    local: &DirTree,
    upstream: &DirTree,
    rules: &RuleMap,
    skip_directories: &BTreeSet<PathBuf>,
) -> Vec<Rule> {
    let mut missed = Vec::new();

    for dir in upstream.dirs() {
        if !local.contains(dir) || rules.contains_key(dir) || skip_directories.contains(dir) {
            continue;
        }
        if is_noise(dir) || !local.has_files(dir) {
            continue;
        }

        let include = inferred_include(dir, local, upstream);
        debug!("Inferred rule for {}: {:?}", dir.display(), include);
        missed.push(Rule::new(&to_posix(dir)).with_include(include));
    }

    missed
}

fn is_noise(dir: &Path) -> bool {
    dir.file_name()
        .is_some_and(|name| NOISE_DIRS.iter().any(|noise| name == *noise))
}

fn inferred_include(dir: &Path, local: &DirTree, upstream: &DirTree) -> Vec<String> {
    let local_exts = local.extensions(dir);
    let upstream_exts = upstream.extensions(dir);

    if !upstream_exts.is_empty() && upstream_exts == local_exts {
        return vec![WILDCARD.to_string()];
    }

    // An empty list falls back to the wildcard in `Rule::with_include`
    local_exts.iter().map(|ext| format!("*.{ext}")).collect()
}

/// Rules whose source no longer exists upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutdatedRules {
    /// Sources missing from both trees; their rules were removed.
    pub dropped: Vec<String>,
    /// Sources still present locally but gone upstream; their rules are kept.
    pub missing_upstream: Vec<String>,
}

impl OutdatedRules {
    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty() && self.missing_upstream.is_empty()
    }
}

/// Check every rule source against both trees.
///
/// A source missing from both trees is dead and its rule is removed from
/// `rules`. A source that only vanished upstream was deleted or renamed
/// there; the rule stays until someone resolves it by hand.
pub fn process_outdated_rules(roots: &RootPaths, rules: &mut RuleMap) -> OutdatedRules {
    let mut outdated = OutdatedRules::default();

    let missing: Vec<PathBuf> = rules
        .keys()
        .filter(|source| !join_rel(&roots.upstream, source).exists())
        .cloned()
        .collect();

    for source in missing {
        if join_rel(&roots.local, &source).exists() {
            outdated.missing_upstream.push(to_posix(&source));
        } else {
            rules.remove(&source);
            outdated.dropped.push(to_posix(&source));
        }
    }

    outdated
}
