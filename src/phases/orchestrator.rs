//! Orchestrator for the complete migration
//!
//! This module coordinates the rule-building phases to turn a legacy rule
//! list into a compact declarative rule set for two live trees.

use std::collections::BTreeSet;
use std::path::PathBuf;

use log::debug;

use super::inference::OutdatedRules;
use super::{phase1, phase2, phase4, RootPaths};
use crate::error::Result;
use crate::rule::{convert_legacy_rows, LegacyRow, Rule, RuleMap};

/// Everything a migration produced, for the caller to persist and report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Migration {
    /// Final rule set ordered by source path.
    pub rules: Vec<Rule>,
    /// Rules synthesized for unlisted common directories.
    pub inferred: Vec<Rule>,
    pub outdated: OutdatedRules,
    /// Rules whose destination does not mirror their parent's.
    pub suspicious: Vec<Rule>,
    /// Container directories that received a collapsed rule of their own.
    pub promoted: Vec<String>,
    /// Conversion warnings from the legacy rows.
    pub warnings: Vec<String>,
}

/// Execute the rule pipeline for an explicit rule list.
///
/// This orchestrates:
/// 1. Scanning the local and upstream trees
/// 2. Inferring rules for common directories nobody listed
/// 3. Dropping rules whose source is gone from both trees
/// 4. Collapsing the result against the upstream tree
pub fn postprocess_rules(
    roots: &RootPaths,
    rules: Vec<Rule>,
    skip_directories: &[PathBuf],
) -> Result<Migration> {
    let mut rule_map: RuleMap = rules.into_iter().map(|r| (r.source_path(), r)).collect();
    let skip: BTreeSet<PathBuf> = skip_directories.iter().cloned().collect();

    // Phase 1: Scan
    let local_tree = phase1::execute(&roots.local)?;
    let upstream_tree = phase1::execute(&roots.upstream)?;

    // Phase 2: Inference
    let inferred = phase2::find_missed_rules(&local_tree, &upstream_tree, &rule_map, &skip);
    for rule in &inferred {
        rule_map.insert(rule.source_path(), rule.clone());
    }
    debug!("Added {} not listed rules", inferred.len());

    // Phase 3: Outdated rules
    let outdated = phase2::process_outdated_rules(roots, &mut rule_map);

    // Phase 4: Collapse
    let collapsed = phase4::collapse_rules(&rule_map, &upstream_tree);
    debug!("Collapsed to {} rules", collapsed.rules.len());

    Ok(Migration {
        rules: collapsed.rules,
        inferred,
        outdated,
        suspicious: collapsed.suspicious,
        promoted: collapsed.promoted,
        warnings: Vec::new(),
    })
}

/// Convert legacy rows and run them through [`postprocess_rules`].
pub fn migrate_legacy(roots: &RootPaths, rows: &[LegacyRow]) -> Result<Migration> {
    let conversion = convert_legacy_rows(rows)?;
    let mut migration = postprocess_rules(roots, conversion.rules, &conversion.skip_directories)?;
    migration.warnings = conversion.warnings;
    Ok(migration)
}
