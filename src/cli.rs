//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use borsch_organizer::output::{OutputConfig, Printer};

use crate::commands;

/// Borsch Organizer - Map an upstream source tree onto a local fork
#[derive(Parser, Debug)]
#[command(name = "organizer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(
        long,
        global = true,
        value_name = "WHEN",
        default_value = "auto",
        value_parser = ["always", "never", "auto"]
    )]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy upstream files into the local tree according to the rule file
    Map(commands::map::MapArgs),

    /// Convert the legacy folders.csv into a collapsed mapping.yaml
    Migrate(commands::migrate::MigrateArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let printer = Printer::new(OutputConfig::from_env_and_flag(&self.color));

        match self.command {
            Commands::Map(args) => commands::map::execute(args, &printer),
            Commands::Migrate(args) => commands::migrate::execute(args, &printer),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Route `log` records to stderr. `RUST_LOG` overrides the flag when set.
fn init_logging(level: &str) {
    let filter = level.parse().unwrap_or(LevelFilter::Info);
    // A logger may already be installed when embedded in tests
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
