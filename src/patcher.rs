//! The external patch step run after a successful mapping.
//!
//! The fork keeps local modifications as patches applied by a script that
//! lives in the local tree. The organizer only launches it and reports its
//! exit status; the script talks to the terminal directly.

use std::path::PathBuf;
use std::process::Command;

use log::debug;

use crate::defaults::DEFAULT_PYTHON;
use crate::error::{Error, Result};
use crate::phases::RootPaths;

/// How to launch the patch script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchStep {
    /// Interpreter executable.
    pub interpreter: String,
    /// Path to the script.
    pub script: PathBuf,
}

impl PatchStep {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: DEFAULT_PYTHON.to_string(),
            script: script.into(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Whether the script exists.
    pub fn is_available(&self) -> bool {
        self.script.is_file()
    }

    /// Arguments passed after the interpreter.
    pub fn args(&self, roots: &RootPaths) -> Vec<String> {
        vec![
            self.script.display().to_string(),
            "apply".to_string(),
            "--upstream".to_string(),
            roots.upstream.display().to_string(),
            "--local".to_string(),
            roots.local.display().to_string(),
        ]
    }

    /// Run the script and wait for it; a non-zero exit is an error.
    pub fn run(&self, roots: &RootPaths) -> Result<()> {
        let args = self.args(roots);
        debug!("Running {} {}", self.interpreter, args.join(" "));

        let status = Command::new(&self.interpreter)
            .args(&args)
            .status()
            .map_err(|e| Error::Patcher {
                message: format!("cannot start '{}': {}", self.interpreter, e),
            })?;

        if !status.success() {
            return Err(Error::Patcher {
                message: format!("'{}' exited with {}", self.script.display(), status),
            });
        }
        Ok(())
    }
}
