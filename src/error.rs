//! # Error Handling
//!
//! Centralized error type for the organizer library. Every fallible library
//! function returns [`Result<T>`], and the binary converts these into
//! `anyhow` errors at the command boundary.
//!
//! The variants fall into a few groups:
//!
//! - Rule file problems: [`Error::ConfigParse`], [`Error::LegacyRow`],
//!   [`Error::BraceRange`], [`Error::SuspiciousExtension`].
//! - Filesystem problems with path context: [`Error::Filesystem`].
//! - External collaborators: [`Error::GitCommand`], [`Error::Patcher`].
//! - Operator decisions: [`Error::Aborted`].
//! - Wrapped library errors (`std::io`, `serde_yaml`, `csv`, `glob`).
//!
//! Per-file and per-directory warnings are not errors; they are returned in
//! the reports produced by the pipeline phases.

use thiserror::Error;

/// Main error type for organizer operations
#[derive(Error, Debug)]
pub enum Error {
    /// The declarative mapping file could not be understood.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the mapping file
        hint: Option<String>,
    },

    /// A row of the legacy CSV file is malformed.
    #[error("Legacy mapping error at line {line}: {message}")]
    LegacyRow { line: u64, message: String },

    /// A `name[a-b]` token could not be expanded.
    #[error("Invalid bracket range in '{token}': {message}")]
    BraceRange { token: String, message: String },

    /// A short token is neither a known extension nor plausibly a filename.
    #[error("Possibly missed extension: '{token}' is not a known extension")]
    SuspiciousExtension { token: String },

    /// An error occurred while reading or writing the host filesystem.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An error occurred while executing a Git command.
    #[error("Git command failed in {path}: {command} - {stderr}")]
    GitCommand {
        command: String,
        path: String,
        stderr: String,
    },

    /// The external patch step failed or could not be started.
    #[error("Patch step failed: {message}")]
    Patcher { message: String },

    /// The operator declined a confirmation prompt.
    #[error("Aborted: {reason}")]
    Aborted { reason: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A CSV parsing error, wrapped from `csv::Error`.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
