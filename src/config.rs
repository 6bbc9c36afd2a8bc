//! # Mapping Files
//!
//! Reading and writing the two rule file formats.
//!
//! ## Declarative format (`mapping.yaml`)
//!
//! ```yaml
//! paths:
//!   - source: src/core
//!     include: ["**/*.cpp", "*.h"]
//!   - source: resources
//!     destination: res
//!     action: copy
//!     exclude: ["themes/*"]
//! ```
//!
//! Only `source` is required. Fields that hold their default are omitted when
//! writing so the file stays minimal and diff-friendly.
//!
//! ## Legacy format (`folders.csv`)
//!
//! Four columns without a header: `old,new,action,ext2keep`. Empty `old` or
//! `new` means the tree root. `ext2keep` is usually quoted because it is
//! itself a comma-separated list.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rule::{LegacyRow, Rule};

/// The persisted shape of a declarative mapping file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingFile {
    #[serde(default)]
    pub paths: Vec<Rule>,
}

/// Parse the contents of a declarative mapping file.
pub fn parse(yaml_content: &str) -> Result<Vec<Rule>> {
    if yaml_content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let file: MappingFile = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some("Expected a 'paths' list whose entries each have a 'source'".to_string()),
    })?;
    Ok(file.paths)
}

/// Read a declarative mapping file from disk.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Rule>> {
    let content = fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Render rules in the persisted form.
pub fn to_yaml(rules: &[Rule]) -> Result<String> {
    let file = MappingFile {
        paths: rules.to_vec(),
    };
    Ok(serde_yaml::to_string(&file)?)
}

/// Write rules to a declarative mapping file, creating parent directories.
pub fn write_file<P: AsRef<Path>>(path: P, rules: &[Rule]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
            message: format!("Failed to create directory '{}': {}", parent.display(), e),
        })?;
    }
    fs::write(path, to_yaml(rules)?).map_err(|e| Error::Filesystem {
        message: format!("Failed to write mapping file '{}': {}", path.display(), e),
    })
}

/// Parse legacy CSV content into rows.
///
/// Every field is trimmed and an empty `old` or `new` becomes `"."`.
pub fn parse_legacy(content: &str) -> Result<Vec<LegacyRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() < 4 {
            return Err(Error::LegacyRow {
                line,
                message: format!("expected 4 columns, found {}", record.len()),
            });
        }
        let root_if_empty = |value: &str| {
            if value.is_empty() {
                ".".to_string()
            } else {
                value.to_string()
            }
        };
        rows.push(LegacyRow {
            old: root_if_empty(&record[0]),
            new: root_if_empty(&record[1]),
            action: record[2].to_string(),
            ext2keep: record[3].to_string(),
        });
    }
    Ok(rows)
}

/// Read a legacy CSV mapping file from disk.
pub fn legacy_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<LegacyRow>> {
    let content = fs::read_to_string(path).map_err(Error::Io)?;
    parse_legacy(&content)
}
