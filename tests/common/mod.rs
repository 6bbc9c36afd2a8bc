//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture holding a local and an upstream tree and
//! helpers for running the `organizer` binary against them.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_both("src/a.cpp", "int a;");
//!     fixture.organizer("map").assert().success();
//! }
//! ```

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::TestFixture;
}

/// A local tree and an upstream tree in separate temporary directories.
pub struct TestFixture {
    pub local: TempDir,
    pub upstream: TempDir,
}

impl TestFixture {
    /// Create two empty trees.
    pub fn new() -> Self {
        Self {
            local: TempDir::new().expect("Failed to create local temp dir"),
            upstream: TempDir::new().expect("Failed to create upstream temp dir"),
        }
    }

    /// Add a file to the local tree.
    pub fn with_local(self, rel: &str, content: &str) -> Self {
        self.local
            .child(rel)
            .write_str(content)
            .expect("Failed to write local file");
        self
    }

    /// Add a file to the upstream tree.
    pub fn with_upstream(self, rel: &str, content: &str) -> Self {
        self.upstream
            .child(rel)
            .write_str(content)
            .expect("Failed to write upstream file");
        self
    }

    /// Add the same file to both trees.
    pub fn with_both(self, rel: &str, content: &str) -> Self {
        self.with_local(rel, content).with_upstream(rel, content)
    }

    /// Write `opt/mapping.yaml` in the local tree.
    pub fn with_mapping(self, yaml: &str) -> Self {
        self.with_local("opt/mapping.yaml", yaml)
    }

    /// Write `opt/folders.csv` in the local tree.
    pub fn with_legacy(self, csv: &str) -> Self {
        self.with_local("opt/folders.csv", csv)
    }

    /// An `organizer <subcommand>` invocation pointed at both trees, with
    /// preflight checks and colours disabled.
    pub fn organizer(&self, subcommand: &str) -> Command {
        let mut cmd = self.organizer_with_checks(subcommand);
        cmd.arg("--no-checks");
        cmd
    }

    /// Like [`TestFixture::organizer`], but the repository state checks run.
    pub fn organizer_with_checks(&self, subcommand: &str) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("organizer");
        cmd.env_remove("BORSCH_LOCAL")
            .env_remove("BORSCH_UPSTREAM")
            .env_remove("BORSCH_MAPPING_FILE")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never")
            .arg(subcommand)
            .arg("--local")
            .arg(self.local.path())
            .arg("--upstream")
            .arg(self.upstream.path());
        cmd
    }

    /// Run `git` in the upstream tree, panicking when it fails.
    pub fn upstream_git(&self, args: &[&str]) {
        let status = std::process::Command::new("git")
            .arg("-C")
            .arg(self.upstream.path())
            .args([
                "-c",
                "user.name=Organizer Tests",
                "-c",
                "user.email=tests@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgsign=false",
            ])
            .args(args)
            .status()
            .expect("Failed to run git");
        assert!(status.success(), "git {:?} failed", args);
    }

    /// Turn the upstream tree into a repository with everything committed.
    pub fn commit_upstream(&self) {
        self.upstream_git(&["init", "--quiet"]);
        self.upstream_git(&["add", "--all"]);
        self.upstream_git(&["commit", "--quiet", "-m", "upstream"]);
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
