//! # Borsch Organizer Library
//!
//! This library provides the core functionality for keeping a fork's source
//! tree in step with an upstream checkout. It is designed to be used by the
//! `organizer` command-line tool but can also be embedded in other tooling
//! that needs to map one directory tree onto another.
//!
//! ## Quick Example
//!
//! ```
//! use borsch_organizer::config;
//! use borsch_organizer::rule::Action;
//!
//! let yaml = r#"
//! paths:
//!   - source: src/core
//!     include: ["**/*.cpp", "*.h"]
//!   - source: resources
//!     destination: res
//!     action: copy
//! "#;
//! let rules = config::parse(yaml).unwrap();
//! assert_eq!(rules.len(), 2);
//! assert_eq!(rules[1].destination(), "res");
//! assert_eq!(rules[1].action, Action::Copy);
//! ```
//!
//! ## Core Concepts
//!
//! - **Rules (`rule`)**: A rule maps an upstream subtree onto the local tree
//!   with include and exclude globs. Rules are plain values.
//! - **Rule files (`config`)**: The declarative `mapping.yaml` format and the
//!   legacy four-column `folders.csv` format it replaces.
//! - **Patterns (`patterns`, `path`)**: Conversion of legacy extension lists
//!   into globs, and glob evaluation on relative paths.
//! - **Phases (`phases`)**: The pipeline that scans both trees, infers missing
//!   rules, collapses the rule set, and applies it.
//! - **Preflight (`git`, `patcher`)**: Repository state checks before a run
//!   and the external patch step after one.
//!
//! ## Execution Flow
//!
//! `migrate` runs [`phases::orchestrator::migrate_legacy`]:
//!
//! 1.  **Scan**: Snapshot the directory structure of both trees.
//! 2.  **Inference**: Add rules for common directories nobody listed.
//! 3.  **Outdated rules**: Drop rules whose source vanished everywhere.
//! 4.  **Collapse**: Fold uniform per-directory rules into recursive ones.
//!
//! `map` reads the resulting rule file and runs [`phases::apply`] for every
//! rule.

pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod output;
pub mod patcher;
pub mod path;
pub mod patterns;
pub mod phases;
pub mod rule;
pub mod suggestions;

#[cfg(test)]
mod patterns_proptest;
