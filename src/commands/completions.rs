//! # Completions Command Implementation
//!
//! `organizer completions <shell>` prints a tab-completion script covering
//! `map`, `migrate` and their flags. Shell names are the ones `clap_complete`
//! understands: bash, elvish, fish, powershell, zsh.
//!
//! ```bash
//! organizer completions bash > ~/.local/share/bash-completion/completions/organizer
//! organizer completions fish > ~/.config/fish/completions/organizer.fish
//! ```

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

const BIN_NAME: &str = "organizer";

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout());
    Ok(())
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    generate(shell, &mut Cli::command(), BIN_NAME, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fish_completions_list_subcommands() {
        let mut out = Vec::new();
        write_completions(Shell::Fish, &mut out);
        let script = String::from_utf8(out).unwrap();

        assert!(script.contains("complete -c organizer"));
        assert!(script.contains("migrate"));
        assert!(script.contains("delete-orphans"));
    }
}
