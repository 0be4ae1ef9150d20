//! Import checks for required packages.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{LauncherError, Result};
use crate::shell::{CommandSpec, ProcessRunner};

/// Checks whether modules are importable under a given interpreter.
pub struct ImportChecker<'a> {
    runner: &'a dyn ProcessRunner,
    interpreter: PathBuf,
}

impl<'a> ImportChecker<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, interpreter: &Path) -> Self {
        Self {
            runner,
            interpreter: interpreter.to_path_buf(),
        }
    }

    /// Whether `import <module>` succeeds.
    ///
    /// A non-zero exit means "not installed". An interpreter that can no
    /// longer be found is an error.
    pub fn is_importable(&self, module: &str) -> Result<bool> {
        let spec = CommandSpec::new(&self.interpreter)
            .arg("-c")
            .arg(format!("import {module}"));

        match self.runner.output(&spec) {
            Ok(result) => Ok(result.success),
            Err(LauncherError::CommandSpawn { source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Err(LauncherError::InterpreterMissing {
                    path: self.interpreter.clone(),
                })
            }
            Err(e) => Err(e),
        }
    }
}
