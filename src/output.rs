//! # Output Configuration
//!
//! Controls how user-facing messages look: whether colour is used and which
//! status prefix each message severity gets.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use borsch_organizer::output::{OutputConfig, Printer};
//!
//! let printer = Printer::new(OutputConfig::from_env_and_flag("auto"));
//! printer.success("Copied src/a.cpp → src/a.cpp");
//! printer.warning("Source upstream/gone missing; skipping");
//! ```

use std::env;

use console::style;

/// Output configuration for controlling colors and symbols.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and unicode status symbols should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `always` forces colour on (overriding `NO_COLOR`), `never` forces it
    /// off, anything else detects support from the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables colour, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the symbol when colour is enabled and the plain alternative
/// otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// How a message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    /// Something would have succeeded (dry runs) or partially did.
    SemiSuccess,
    Warning,
    Failure,
    Info,
}

impl Severity {
    fn symbol<'a>(&self, config: &OutputConfig) -> &'a str {
        match self {
            Severity::Success => emoji(config, "✓", "[ok]"),
            Severity::SemiSuccess => emoji(config, "✓", "[~]"),
            Severity::Warning => emoji(config, "!", "[!]"),
            Severity::Failure => emoji(config, "✗", "[x]"),
            Severity::Info => emoji(config, "ℹ", "[i]"),
        }
    }

    /// Warnings and failures go to stderr.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Severity::Warning | Severity::Failure)
    }
}

/// Prints single-line status messages with a severity prefix.
#[derive(Debug, Clone)]
pub struct Printer {
    config: OutputConfig,
}

impl Printer {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Render a message without printing it.
    pub fn format(&self, severity: Severity, text: &str) -> String {
        let symbol = severity.symbol(&self.config);
        if !self.config.use_color {
            return format!("{} {}", symbol, text);
        }

        let styled = style(symbol).force_styling(true);
        let styled = match severity {
            Severity::Success => styled.green(),
            Severity::SemiSuccess | Severity::Warning => styled.yellow(),
            Severity::Failure => styled.red(),
            Severity::Info => styled.magenta(),
        };
        format!("{} {}", styled.bold(), text)
    }

    pub fn print(&self, severity: Severity, text: &str) {
        let line = self.format(severity, text);
        if severity.is_diagnostic() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn success(&self, text: &str) {
        self.print(Severity::Success, text);
    }

    pub fn semi_success(&self, text: &str) {
        self.print(Severity::SemiSuccess, text);
    }

    pub fn warning(&self, text: &str) {
        self.print(Severity::Warning, text);
    }

    pub fn failure(&self, text: &str) {
        self.print(Severity::Failure, text);
    }

    pub fn info(&self, text: &str) {
        self.print(Severity::Info, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_always() {
        let config = OutputConfig::from_env_and_flag("always");
        assert!(config.use_color);
    }

    #[test]
    fn test_color_never() {
        let config = OutputConfig::from_env_and_flag("never");
        assert!(!config.use_color);
    }

    #[test]
    fn test_emoji_helper() {
        assert_eq!(emoji(&OutputConfig::with_color(), "✓", "[ok]"), "✓");
        assert_eq!(emoji(&OutputConfig::without_color(), "✓", "[ok]"), "[ok]");
    }

    #[test]
    fn test_plain_prefixes() {
        let printer = Printer::new(OutputConfig::without_color());
        assert_eq!(printer.format(Severity::Success, "done"), "[ok] done");
        assert_eq!(printer.format(Severity::SemiSuccess, "would copy"), "[~] would copy");
        assert_eq!(printer.format(Severity::Warning, "careful"), "[!] careful");
        assert_eq!(printer.format(Severity::Failure, "broken"), "[x] broken");
        assert_eq!(printer.format(Severity::Info, "note"), "[i] note");
    }

    #[test]
    fn test_colored_prefixes() {
        let printer = Printer::new(OutputConfig::with_color());
        let line = printer.format(Severity::Failure, "broken");
        assert!(line.contains('✗'));
        assert!(line.contains("\u{1b}["));
        assert!(line.ends_with(" broken"));
    }

    #[test]
    fn test_diagnostic_severities() {
        assert!(Severity::Warning.is_diagnostic());
        assert!(Severity::Failure.is_diagnostic());
        assert!(!Severity::Success.is_diagnostic());
        assert!(!Severity::Info.is_diagnostic());
    }
}
