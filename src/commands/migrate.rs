//! # Migrate Command Implementation
//!
//! This module implements the `migrate` subcommand, which turns the legacy
//! `folders.csv` into a collapsed `mapping.yaml`.
//!
//! The legacy rows are converted to rules, rules are inferred for common
//! directories nobody listed, rules whose source vanished are dropped, and
//! the result is collapsed against the upstream tree. Everything noteworthy
//! along the way (suspicious rules, sources missing upstream) is reported
//! so the operator can review the new file before committing it.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use borsch_organizer::config;
use borsch_organizer::defaults;
use borsch_organizer::error::Error;
use borsch_organizer::git;
use borsch_organizer::output::Printer;
use borsch_organizer::path::rel_path;
use borsch_organizer::phases::orchestrator::{self, Migration};
use borsch_organizer::phases::RootPaths;
use borsch_organizer::suggestions;

use super::{confirm, preflight, RootArgs};

/// Convert the legacy folders.csv into a collapsed mapping.yaml
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub roots: RootArgs,

    /// Legacy rule file [default: opt/folders.csv under the local root]
    #[arg(long, value_name = "FILE")]
    pub legacy_file: Option<PathBuf>,

    /// Output rule file [default: opt/mapping.yaml under the local root]
    #[arg(long, value_name = "FILE", env = "BORSCH_MAPPING_FILE")]
    pub mapping_file: Option<PathBuf>,

    /// Print the resulting rule file instead of writing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Delete the legacy file afterwards without asking
    #[arg(long)]
    pub remove_legacy: bool,
}

/// Execute the `migrate` command.
pub fn execute(args: MigrateArgs, printer: &Printer) -> Result<()> {
    let roots = args.roots.resolve()?;
    if !args.roots.no_checks {
        preflight(&roots, printer)?;
    }

    let legacy_file = args
        .legacy_file
        .clone()
        .unwrap_or_else(|| defaults::default_legacy_file(&roots.local));
    if !legacy_file.is_file() {
        return Err(suggestions::legacy_not_found(&legacy_file));
    }

    let rows = config::legacy_from_file(&legacy_file)?;
    printer.info(&format!("Read {} rows from {}", rows.len(), legacy_file.display()));

    let migration = orchestrator::migrate_legacy(&roots, &rows)?;
    report(&migration, &roots, !args.roots.no_checks, printer);

    if args.dry_run {
        print!("{}", config::to_yaml(&migration.rules)?);
        printer.semi_success("Dry run: mapping file not written");
        return Ok(());
    }

    let mapping_file = args
        .mapping_file
        .clone()
        .unwrap_or_else(|| defaults::default_mapping_file(&roots.local));
    if mapping_file.exists()
        && !confirm(
            &format!("{} exists. Overwrite?", mapping_file.display()),
            false,
        )?
    {
        return Err(Error::Aborted {
            reason: format!("{} left untouched", mapping_file.display()),
        }
        .into());
    }

    config::write_file(&mapping_file, &migration.rules)?;
    printer.success(&format!(
        "Wrote {} rules to {}",
        migration.rules.len(),
        mapping_file.display()
    ));

    if args.remove_legacy || confirm("Remove legacy folders.csv?", false)? {
        fs::remove_file(&legacy_file).map_err(|e| Error::Filesystem {
            message: format!("Failed to remove '{}': {}", legacy_file.display(), e),
        })?;
        printer.success(&format!("Removed {}", legacy_file.display()));
    }

    printer.success("Migration completed. Please check the new mapping.yaml file.");
    Ok(())
}

/// Print what the migration changed or found suspicious.
///
/// With `use_git`, sources missing upstream are annotated with what the
/// upstream history says happened to them.
fn report(migration: &Migration, roots: &RootPaths, use_git: bool, printer: &Printer) {
    for warning in &migration.warnings {
        printer.warning(warning);
    }

    if !migration.inferred.is_empty() {
        printer.info(&format!("Added {} not listed rules", migration.inferred.len()));
        for rule in &migration.inferred {
            printer.info(&format!("  {}", rule.source));
        }
    }

    for source in &migration.outdated.missing_upstream {
        let change = if use_git {
            git::missing_path_change(&roots.upstream, &rel_path(source))
        } else {
            None
        };
        match change {
            Some(change) => printer.warning(&format!(
                "Directory {source} is missing in upstream ({} upstream)",
                change.describe()
            )),
            None => printer.warning(&format!("Directory {source} is missing in upstream")),
        }
    }
    for source in &migration.outdated.dropped {
        printer.info(&format!("Dropped rule for {source}, gone from both trees"));
    }

    for rule in &migration.suspicious {
        printer.warning(&format!("Suspicious rule: {rule}"));
    }
    for container in &migration.promoted {
        printer.info(&format!("Added collapsed rule for {container}"));
    }

    printer.info(&format!("Collapsed to {} rules", migration.rules.len()));
}
