//! Implementation of the phases of the organizer pipeline.
//!
//! ## Overview
//!
//! Migrating a legacy rule list runs these phases in order:
//! 1. Scan - Snapshot the directory structure of the local and upstream trees
//! 2. Inference - Synthesize rules for directories present in both trees but unlisted
//! 3. Outdated rules - Drop rules whose source vanished from both trees
//! 4. Collapse - Merge uniform per-directory rules into recursive glob rules
//!
//! Mapping an existing rule file runs only the last phase:
//! 5. Apply - Copy matching upstream files into the local tree
//!
//! Every phase receives its roots and inputs explicitly; nothing depends on
//! the process working directory.

use std::path::PathBuf;

pub mod apply;
pub mod collapse;
pub mod inference;
pub mod orchestrator;
pub mod scan;

pub use apply as phase5;
pub use collapse as phase4;
pub use inference as phase2;
pub use scan as phase1;

pub use scan::DirTree;

/// The two trees every command works between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPaths {
    /// The fork being synchronized into.
    pub local: PathBuf,
    /// The reference checkout being mirrored from.
    pub upstream: PathBuf,
}

impl RootPaths {
    pub fn new(local: impl Into<PathBuf>, upstream: impl Into<PathBuf>) -> Self {
        Self {
            local: local.into(),
            upstream: upstream.into(),
        }
    }
}
