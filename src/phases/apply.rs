//! Phase 5: Mapping Application
//!
//! Copies the upstream files selected by each rule into the local tree.
//!
//! A file is copied only when the destination is missing or differs by
//! content, so repeated runs converge and report every file as unchanged.
//! Rules are independent; they are applied one after another in the order
//! given and no rule's outcome affects another.
//!
//! `sync` and `copy` rules behave the same unless orphan deletion is
//! requested, in which case destination files of a `sync` rule that match
//! its filters but no longer exist upstream are removed.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use filetime::FileTime;
use log::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

use super::RootPaths;
use crate::defaults::VCS_DIR;
use crate::error::{Error, Result};
use crate::path::{join_rel, PatternSet};
use crate::rule::{Action, Rule};

/// Options controlling a mapping run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Report what would change without touching the local tree.
    pub dry_run: bool,
    /// Remove orphaned destination files of `sync` rules.
    pub delete_orphans: bool,
}

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileAction {
    Unchanged,
    Copied,
    WouldCopy,
    Deleted,
    WouldDelete,
    DeleteFailed,
}

/// A per-file result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub action: FileAction,
    /// Upstream file, absent for deletions.
    pub source: Option<PathBuf>,
    pub destination: PathBuf,
    /// Error text for failed deletions.
    pub detail: Option<String>,
}

impl FileEvent {
    fn copy(action: FileAction, source: &Path, destination: &Path) -> Self {
        Self {
            action,
            source: Some(source.to_path_buf()),
            destination: destination.to_path_buf(),
            detail: None,
        }
    }

    fn delete(action: FileAction, destination: &Path, detail: Option<String>) -> Self {
        Self {
            action,
            source: None,
            destination: destination.to_path_buf(),
            detail,
        }
    }
}

/// Result of applying one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule ran; one event per file it touched or inspected.
    Applied(Vec<FileEvent>),
    /// The rule's upstream source does not exist.
    MissingSource(PathBuf),
    /// The rule's action is `skip`.
    Skipped,
}

/// Summary of a mapping run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapReport {
    /// Number of rules processed.
    pub rules: usize,
    pub skipped_rules: usize,
    pub missing_sources: Vec<PathBuf>,
    pub events: Vec<FileEvent>,
}

impl MapReport {
    /// Number of files that ended in `action`.
    pub fn count(&self, action: FileAction) -> usize {
        self.events.iter().filter(|e| e.action == action).count()
    }
}

/// Apply every rule in order, calling `on_rule` after each one.
///
/// A missing source is recorded and the run continues. I/O failures while
/// copying abort the run.
pub fn apply_rules<F>(
    rules: &[Rule],
    roots: &RootPaths,
    options: ApplyOptions,
    mut on_rule: F,
) -> Result<MapReport>
where
    F: FnMut(&Rule, &RuleOutcome),
{
    let mut report = MapReport::default();

    for rule in rules {
        let outcome = apply_rule(rule, roots, options)?;
        on_rule(rule, &outcome);

        report.rules += 1;
        match outcome {
            RuleOutcome::Applied(events) => report.events.extend(events),
            RuleOutcome::MissingSource(path) => report.missing_sources.push(path),
            RuleOutcome::Skipped => report.skipped_rules += 1,
        }
    }

    Ok(report)
}

/// Apply a single rule.
pub fn apply_rule(rule: &Rule, roots: &RootPaths, options: ApplyOptions) -> Result<RuleOutcome> {
    if rule.action == Action::Skip {
        return Ok(RuleOutcome::Skipped);
    }

    let source = join_rel(&roots.upstream, &rule.source_path());
    let destination = join_rel(&roots.local, &rule.destination_path());
    debug!("Applying {} ({})", rule, rule.action);

    if !source.exists() {
        debug!("Source {} missing; skipping", source.display());
        return Ok(RuleOutcome::MissingSource(source));
    }

    if source.is_file() {
        let event = copy_or_report(&source, &destination, options.dry_run)?;
        return Ok(RuleOutcome::Applied(vec![event]));
    }

    let include = PatternSet::new(rule.include.as_slice())?;
    let exclude = PatternSet::new(rule.exclude.as_slice())?;
    let mut events = Vec::new();

    for (file, rel) in matching_files(&source, &include, &exclude) {
        events.push(copy_or_report(&file, &destination.join(&rel), options.dry_run)?);
    }

    if options.delete_orphans && rule.action.is_sync() && destination.is_dir() {
        for (file, rel) in matching_files(&destination, &include, &exclude) {
            if !source.join(&rel).exists() {
                events.push(delete_or_report(&file, options.dry_run));
            }
        }
    }

    Ok(RuleOutcome::Applied(events))
}

/// Files under `root` selected by `include` and not by `exclude`, as
/// (absolute path, path relative to `root`) pairs in walk order.
fn matching_files(
    root: &Path,
    include: &PatternSet,
    exclude: &PatternSet,
) -> Vec<(PathBuf, PathBuf)> {
    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if !include.is_recursive() {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker.into_iter().filter_entry(|e| !is_vcs_dir(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.path().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        if include.matches(rel) && !exclude.matches(rel) {
            files.push((entry.path().to_path_buf(), rel.to_path_buf()));
        } else {
            trace!("Not selected: {}", rel.display());
        }
    }
    files
}

fn is_vcs_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == VCS_DIR
}

fn copy_or_report(source: &Path, destination: &Path, dry_run: bool) -> Result<FileEvent> {
    if destination.is_file() && files_identical(source, destination)? {
        return Ok(FileEvent::copy(FileAction::Unchanged, source, destination));
    }

    if dry_run {
        return Ok(FileEvent::copy(FileAction::WouldCopy, source, destination));
    }

    copy_preserving_times(source, destination)?;
    Ok(FileEvent::copy(FileAction::Copied, source, destination))
}

fn delete_or_report(path: &Path, dry_run: bool) -> FileEvent {
    if dry_run {
        return FileEvent::delete(FileAction::WouldDelete, path, None);
    }
    match fs::remove_file(path) {
        Ok(()) => FileEvent::delete(FileAction::Deleted, path, None),
        Err(e) => FileEvent::delete(FileAction::DeleteFailed, path, Some(e.to_string())),
    }
}

/// Copy `source` over `destination`, creating parent directories and
/// carrying over the access and modification times.
fn copy_preserving_times(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
            message: format!("Failed to create directory '{}': {}", parent.display(), e),
        })?;
    }

    fs::copy(source, destination).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to copy '{}' to '{}': {}",
            source.display(),
            destination.display(),
            e
        ),
    })?;

    let metadata = fs::metadata(source)?;
    filetime::set_file_times(
        destination,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )
    .map_err(|e| Error::Filesystem {
        message: format!("Failed to set times on '{}': {}", destination.display(), e),
    })
}

/// Byte-for-byte comparison of two files.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::new(File::open(a)?);
    let mut reader_b = BufReader::new(File::open(b)?);
    loop {
        let chunk_a = reader_a.fill_buf()?;
        let chunk_b = reader_b.fill_buf()?;
        if chunk_a.is_empty() || chunk_b.is_empty() {
            return Ok(chunk_a.is_empty() && chunk_b.is_empty());
        }
        let n = chunk_a.len().min(chunk_b.len());
        if chunk_a[..n] != chunk_b[..n] {
            return Ok(false);
        }
        reader_a.consume(n);
        reader_b.consume(n);
    }
}
