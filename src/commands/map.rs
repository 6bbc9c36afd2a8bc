//! # Map Command Implementation
//!
//! This module implements the `map` subcommand, which copies the upstream
//! files selected by the rule file into the local tree.
//!
//! ## Functionality
//!
//! 1. **Preflight**: Unless `--no-checks` is given, checks both trees for
//!    uncommitted changes and asks the operator to confirm the upstream tag.
//! 2. **Rule loading**: Reads `mapping.yaml`, falling back to the legacy
//!    `folders.csv` which is converted in memory.
//! 3. **Application**: Applies every rule in order and prints one line per
//!    copied, deleted or (with `--verbose` or `--dry-run`) unchanged file.
//! 4. **Patch step**: After a real run, optionally launches the fork's patch
//!    script with both tree roots.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use borsch_organizer::config;
use borsch_organizer::defaults::{self, DEFAULT_PYTHON};
use borsch_organizer::output::{Printer, Severity};
use borsch_organizer::patcher::PatchStep;
use borsch_organizer::path::to_posix;
use borsch_organizer::phases::apply::{self, ApplyOptions, FileAction, FileEvent, RuleOutcome};
use borsch_organizer::phases::RootPaths;
use borsch_organizer::rule::{convert_legacy_rows, Rule};
use borsch_organizer::suggestions;

use super::{confirm, preflight, RootArgs};

/// Copy upstream files into the local tree according to the rule file
#[derive(Args, Debug)]
pub struct MapArgs {
    #[command(flatten)]
    pub roots: RootArgs,

    /// Rule file [default: opt/mapping.yaml, then opt/folders.csv under the local root]
    #[arg(long, value_name = "FILE", env = "BORSCH_MAPPING_FILE")]
    pub mapping_file: Option<PathBuf>,

    /// Show what would change without touching the local tree
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Also report files that are already up to date
    #[arg(short, long)]
    pub verbose: bool,

    /// Run the patch step afterwards without asking
    #[arg(long)]
    pub apply_patches: bool,

    /// Delete local files of sync rules that no longer exist upstream
    #[arg(long)]
    pub delete_orphans: bool,

    /// Patch script [default: scripts/patcher.py under the local root]
    #[arg(long, value_name = "PATH")]
    pub patcher: Option<PathBuf>,

    /// Interpreter for the patch script
    #[arg(long, value_name = "EXE", env = "BORSCH_PYTHON", default_value = DEFAULT_PYTHON)]
    pub python: String,
}

/// Execute the `map` command.
pub fn execute(args: MapArgs, printer: &Printer) -> Result<()> {
    let roots = args.roots.resolve()?;
    if !args.roots.no_checks {
        preflight(&roots, printer)?;
    }

    let mapping_file = match &args.mapping_file {
        Some(path) => path.clone(),
        None => defaults::find_mapping_file(&roots.local)
            .unwrap_or_else(|| defaults::default_mapping_file(&roots.local)),
    };
    if !mapping_file.is_file() {
        let dir = mapping_file.parent().unwrap_or(&roots.local);
        return Err(suggestions::mapping_not_found(dir));
    }

    let rules = load_rules(&mapping_file, printer)?;
    validate_patterns(&rules)?;
    printer.info(&format!(
        "Read {} rules from {}",
        rules.len(),
        mapping_file.display()
    ));

    let options = ApplyOptions {
        dry_run: args.dry_run,
        delete_orphans: args.delete_orphans,
    };
    let report = apply::apply_rules(&rules, &roots, options, |_, outcome| match outcome {
        RuleOutcome::Applied(events) => {
            for event in events {
                if let Some((severity, line)) =
                    format_event(event, &roots, args.verbose, args.dry_run)
                {
                    printer.print(severity, &line);
                }
            }
        }
        RuleOutcome::MissingSource(path) => printer.warning(&format!(
            "Source {} missing; skipping",
            display_under(path, &roots.upstream)
        )),
        RuleOutcome::Skipped => {}
    })?;

    if args.dry_run {
        printer.semi_success(&format!(
            "Dry run: {} files would be copied, {} would be deleted",
            report.count(FileAction::WouldCopy),
            report.count(FileAction::WouldDelete)
        ));
    } else {
        printer.info(&format!(
            "{} files copied, {} unchanged, {} deleted",
            report.count(FileAction::Copied),
            report.count(FileAction::Unchanged),
            report.count(FileAction::Deleted)
        ));
    }
    if !report.missing_sources.is_empty() {
        printer.warning(&format!(
            "{} rules skipped because their source is missing",
            report.missing_sources.len()
        ));
    }
    let failed = report.count(FileAction::DeleteFailed);
    if failed > 0 {
        printer.failure(&format!("{failed} files could not be deleted"));
    }
    printer.success(&format!(
        "Mapping completed. {} rules applied",
        report.rules - report.skipped_rules
    ));

    if !args.dry_run {
        let script = args
            .patcher
            .clone()
            .unwrap_or_else(|| defaults::default_patcher(&roots.local));
        run_patch_step(
            &PatchStep::new(script).with_interpreter(&args.python),
            &roots,
            args.apply_patches,
            printer,
        )?;
    }

    Ok(())
}

/// Read rules from a declarative or legacy rule file, chosen by extension.
fn load_rules(path: &Path, printer: &Printer) -> Result<Vec<Rule>> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        return Ok(config::from_file(path)?);
    }

    printer.warning("Using legacy folders.csv, consider running 'organizer migrate'");
    let rows = config::legacy_from_file(path)?;
    let conversion = convert_legacy_rows(&rows)?;
    for warning in &conversion.warnings {
        printer.warning(warning);
    }
    Ok(conversion.rules)
}

/// Reject rules carrying malformed globs before anything is copied.
fn validate_patterns(rules: &[Rule]) -> Result<()> {
    for rule in rules {
        for pattern in rule.include.iter().chain(&rule.exclude) {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(suggestions::invalid_glob(&rule.source, pattern, &e));
            }
        }
    }
    Ok(())
}

fn run_patch_step(
    step: &PatchStep,
    roots: &RootPaths,
    auto: bool,
    printer: &Printer,
) -> Result<()> {
    if !step.is_available() {
        log::debug!("No patch script at {}", step.script.display());
        return Ok(());
    }
    if !auto && !confirm("Apply patches using patcher.py?", false)? {
        printer.info("Patches not applied");
        return Ok(());
    }

    step.run(roots)?;
    printer.success("Patches applied");
    Ok(())
}

fn display_under(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => to_posix(rel),
        Err(_) => path.display().to_string(),
    }
}

/// The line to print for a file event, if any.
///
/// Unchanged files are only reported when `verbose` or `dry_run` is set.
fn format_event(
    event: &FileEvent,
    roots: &RootPaths,
    verbose: bool,
    dry_run: bool,
) -> Option<(Severity, String)> {
    let destination = display_under(&event.destination, &roots.local);
    let source = event
        .source
        .as_deref()
        .map(|s| display_under(s, &roots.upstream))
        .unwrap_or_default();

    match event.action {
        FileAction::Unchanged if verbose || dry_run => {
            Some((Severity::Info, format!("Unchanged {destination}")))
        }
        FileAction::Unchanged => None,
        FileAction::Copied => Some((
            Severity::Success,
            format!("Copied {source} → {destination}"),
        )),
        FileAction::WouldCopy => Some((
            Severity::SemiSuccess,
            format!("Would copy {source} → {destination}"),
        )),
        FileAction::Deleted => Some((Severity::Warning, format!("Deleted {destination}"))),
        FileAction::WouldDelete => Some((
            Severity::SemiSuccess,
            format!("Would delete {destination}"),
        )),
        FileAction::DeleteFailed => Some((
            Severity::Failure,
            format!(
                "Cannot delete {destination}: {}",
                event.detail.as_deref().unwrap_or("unknown error")
            ),
        )),
    }
}
