//! Read-only git queries used by the preflight checks.
//!
//! Everything here shells out to the system `git` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::defaults::VCS_DIR;
use crate::error::Error;

/// How a path vanished from a repository, according to its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamChange {
    Deleted,
    Renamed,
}

impl UpstreamChange {
    pub fn describe(&self) -> &'static str {
        match self {
            UpstreamChange::Deleted => "deleted",
            UpstreamChange::Renamed => "renamed",
        }
    }
}

/// Nearest ancestor of `start` (inclusive) holding a `.git` directory.
///
/// Falls back to `start` itself when no ancestor is a repository.
pub fn find_git_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(VCS_DIR).is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

fn run_git(repo: &Path, args: &[&str]) -> Result<Output, Error> {
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            path: repo.display().to_string(),
            stderr: e.to_string(),
        })
}

/// Whether the working tree at `repo` has uncommitted changes.
pub fn has_uncommitted_changes(repo: &Path) -> Result<bool, Error> {
    let output = run_git(repo, &["status", "--porcelain"])?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: "status --porcelain".to_string(),
            path: repo.display().to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// The most recent tag reachable from `HEAD`, if any.
pub fn latest_tag(repo: &Path) -> Result<Option<String>, Error> {
    let output = run_git(repo, &["describe", "--tags", "--abbrev=0"])?;

    // describe exits non-zero when no tag is reachable
    if !output.status.success() {
        return Ok(None);
    }

    let tag = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!tag.is_empty()).then_some(tag))
}

/// Look up how `rel` disappeared from `repo`, following renames.
///
/// Returns `None` when the history says nothing useful or git fails.
pub fn missing_path_change(repo: &Path, rel: &Path) -> Option<UpstreamChange> {
    let rel = rel.to_string_lossy().into_owned();
    let output = run_git(
        repo,
        &[
            "log",
            "--follow",
            "--find-renames",
            "--name-status",
            "--format=%H",
            "--",
            rel.as_str(),
        ],
    )
    .ok()?;

    if !output.status.success() {
        return None;
    }
    parse_name_status(&String::from_utf8_lossy(&output.stdout))
}

/// Classify `git log --name-status --format=%H` output.
///
/// A deletion anywhere in the history wins over renames.
pub fn parse_name_status(log: &str) -> Option<UpstreamChange> {
    let mut renamed = false;

    for line in log.lines().map(str::trim) {
        if line.is_empty() || line.chars().all(|c| c.is_ascii_hexdigit()) {
            continue;
        }
        let status = line.split('\t').next().unwrap_or_default();
        if status == "D" {
            return Some(UpstreamChange::Deleted);
        }
        if status.starts_with('R') {
            renamed = true;
        }
    }

    renamed.then_some(UpstreamChange::Renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_git_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(".git")).unwrap();
        let nested = temp_dir.path().join("src/core");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_git_root(&nested), temp_dir.path());
    }

    #[test]
    fn test_find_git_root_falls_back_to_start() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("plain");
        fs::create_dir_all(&nested).unwrap();

        // The temp dir may itself live under a repository; only check the
        // fallback when it does not.
        let root = find_git_root(&nested);
        if !root.join(".git").is_dir() {
            assert_eq!(root, nested);
        }
    }

    #[test]
    fn test_parse_name_status_deleted() {
        let log = "\
3f2a9c0d1e
D\tsrc/old/file.cpp

9b8c7d6e5f
R087\tsrc/older/file.cpp\tsrc/old/file.cpp
";
        assert_eq!(parse_name_status(log), Some(UpstreamChange::Deleted));
    }

    #[test]
    fn test_parse_name_status_renamed() {
        let log = "\
abcdef0123
R100\tsrc/a.cpp\tsrc/b.cpp

0123abcdef
M\tsrc/a.cpp
";
        assert_eq!(parse_name_status(log), Some(UpstreamChange::Renamed));
    }

    #[test]
    fn test_parse_name_status_nothing_useful() {
        assert_eq!(parse_name_status(""), None);
        assert_eq!(parse_name_status("abcdef\nM\tsrc/a.cpp\n"), None);
    }

    #[test]
    fn test_has_uncommitted_changes_outside_repository() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");
        assert!(has_uncommitted_changes(&missing).is_err());
    }
}
