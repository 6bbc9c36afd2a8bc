//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `organizer`
//! command-line tool. Each subcommand is defined in its own file to keep the
//! logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! The options shared by `map` and `migrate` (the two tree roots and the
//! preflight switch) live here in [`RootArgs`], together with the preflight
//! checks and the confirmation prompt both commands use.

pub mod completions;
pub mod map;
pub mod migrate;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use log::debug;

use borsch_organizer::error::Error;
use borsch_organizer::git;
use borsch_organizer::output::Printer;
use borsch_organizer::phases::RootPaths;
use borsch_organizer::suggestions;

/// Tree roots and preflight options shared by `map` and `migrate`
#[derive(Args, Debug, Clone)]
pub struct RootArgs {
    /// Local (fork) tree root [default: nearest git repository of the working directory]
    #[arg(long, value_name = "PATH", env = "BORSCH_LOCAL")]
    pub local: Option<PathBuf>,

    /// Upstream tree root
    #[arg(long, value_name = "PATH", env = "BORSCH_UPSTREAM")]
    pub upstream: PathBuf,

    /// Skip the repository state checks before running
    #[arg(long)]
    pub no_checks: bool,
}

impl RootArgs {
    /// Resolve both roots to canonical directories.
    pub fn resolve(&self) -> Result<RootPaths> {
        let local = match &self.local {
            Some(path) => path.clone(),
            None => git::find_git_root(&env::current_dir()?),
        };

        Ok(RootPaths::new(
            existing_dir("local", &local)?,
            existing_dir("upstream", &self.upstream)?,
        ))
    }
}

fn existing_dir(kind: &str, path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(suggestions::root_not_found(kind, path));
    }
    Ok(path.canonicalize()?)
}

/// Check repository state before touching anything.
///
/// Uncommitted changes in either tree need confirmation to continue. The
/// upstream tag is shown for confirmation; a missing tag is only a warning.
/// Git failures count as "no information".
pub fn preflight(roots: &RootPaths, printer: &Printer) -> Result<()> {
    for (name, root) in [("fork", &roots.local), ("upstream", &roots.upstream)] {
        match git::has_uncommitted_changes(root) {
            Ok(true) => {
                printer.warning(&format!("There are uncommitted changes in the {name}"));
                let question = format!("Continue despite uncommitted changes in the {name}?");
                if !confirm(&question, false)? {
                    return Err(Error::Aborted {
                        reason: format!("uncommitted changes in the {name}"),
                    }
                    .into());
                }
            }
            Ok(false) => {}
            Err(e) => debug!("Cannot query {name} status: {e}"),
        }
    }

    match git::latest_tag(&roots.upstream) {
        Ok(Some(tag)) => {
            if !confirm(&format!("Upstream version is {tag}. Continue?"), true)? {
                return Err(Error::Aborted {
                    reason: format!("upstream version {tag} not confirmed"),
                }
                .into());
            }
        }
        Ok(None) => printer.warning("Could not determine upstream version tag."),
        Err(e) => {
            debug!("Cannot query upstream tag: {e}");
            printer.warning("Could not determine upstream version tag.");
        }
    }

    Ok(())
}

/// Ask a yes/no question, taking `default` when nobody is at the terminal.
pub fn confirm(question: &str, default: bool) -> Result<bool> {
    if !console::user_attended() {
        debug!("Unattended session; answering '{question}' with the default");
        return Ok(default);
    }

    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(question)
        .default(default)
        .interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_explicit_roots() {
        let local = TempDir::new().unwrap();
        let upstream = TempDir::new().unwrap();
        let args = RootArgs {
            local: Some(local.path().to_path_buf()),
            upstream: upstream.path().to_path_buf(),
            no_checks: true,
        };

        let roots = args.resolve().unwrap();
        assert_eq!(roots.local, local.path().canonicalize().unwrap());
        assert_eq!(roots.upstream, upstream.path().canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_missing_upstream() {
        let local = TempDir::new().unwrap();
        let args = RootArgs {
            local: Some(local.path().to_path_buf()),
            upstream: local.path().join("missing"),
            no_checks: false,
        };

        let message = args.resolve().unwrap_err().to_string();
        assert!(message.contains("upstream tree"));
        assert!(message.contains("--upstream"));
        assert!(message.contains("BORSCH_UPSTREAM"));
    }
}
