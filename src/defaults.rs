//! Default values for organizer configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Directory under the local root holding the mapping files.
pub const MAPPING_DIR: &str = "opt";

/// File name of the declarative mapping file.
pub const MAPPING_FILENAME: &str = "mapping.yaml";

/// File name of the legacy four-column mapping file.
pub const LEGACY_FILENAME: &str = "folders.csv";

/// Location of the external patch script relative to the local root.
pub const PATCHER_PATH: &str = "scripts/patcher.py";

/// Interpreter used to run the patch script.
pub const DEFAULT_PYTHON: &str = "python3";

/// Version-control metadata directory.
pub const VCS_DIR: &str = ".git";

/// Top-level directories never scanned.
pub const IGNORED_DIRS: &[&str] = &[VCS_DIR, "build"];

/// Directory names never given an inferred rule.
pub const NOISE_DIRS: &[&str] = &["__pycache__"];

/// Default declarative mapping file for a local root.
pub fn default_mapping_file(local: &Path) -> PathBuf {
    local.join(MAPPING_DIR).join(MAPPING_FILENAME)
}

/// Default legacy mapping file for a local root.
pub fn default_legacy_file(local: &Path) -> PathBuf {
    local.join(MAPPING_DIR).join(LEGACY_FILENAME)
}

/// Default patch script for a local root.
pub fn default_patcher(local: &Path) -> PathBuf {
    local.join(PATCHER_PATH)
}

/// The mapping file `map` should read when none is given.
///
/// Prefers the declarative file and falls back to the legacy one; returns
/// `None` when neither exists.
pub fn find_mapping_file(local: &Path) -> Option<PathBuf> {
    [default_mapping_file(local), default_legacy_file(local)]
        .into_iter()
        .find(|candidate| candidate.is_file())
}
