//! Installing missing packages with pip.

use std::path::{Path, PathBuf};

use crate::config::PackageRequirement;
use crate::error::{LauncherError, Result};
use crate::requirements::checker::ImportChecker;
use crate::requirements::status::{PackageStatus, ReconcileReport};
use crate::shell::{progress_segments, CommandSpec, ProcessRunner};

/// Brings the package list into an importable state under one interpreter.
pub struct PackageReconciler<'a> {
    runner: &'a dyn ProcessRunner,
    interpreter: PathBuf,
}

impl<'a> PackageReconciler<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, interpreter: &Path) -> Self {
        Self {
            runner,
            interpreter: interpreter.to_path_buf(),
        }
    }

    /// The pip command for one package.
    pub fn pip_command(&self, package: &str) -> CommandSpec {
        CommandSpec::new(&self.interpreter)
            .args(["-m", "pip", "install"])
            .arg(package)
            .arg("--disable-pip-version-check")
    }

    /// Install one package, logging pip's output as it arrives.
    pub fn install(&self, package: &str) -> Result<()> {
        tracing::info!("Installing package {} via pip...", package);

        let result = self.runner.stream(&self.pip_command(package), &mut |line| {
            for segment in progress_segments(line.text()) {
                tracing::info!("{}", segment);
            }
        })?;

        if !result.success {
            return Err(LauncherError::PackageInstallFailed {
                package: package.to_string(),
                code: result.exit_code,
            });
        }

        tracing::info!(
            "Package {} installed successfully ({:.1}s).",
            package,
            result.duration.as_secs_f64()
        );
        Ok(())
    }

    /// Check each package in order and install the ones that are missing.
    ///
    /// Stops at the first failed install; later packages are not attempted.
    pub fn reconcile(&self, packages: &[PackageRequirement]) -> Result<ReconcileReport> {
        let checker = ImportChecker::new(self.runner, &self.interpreter);
        let total = packages.len();
        let mut report = ReconcileReport::default();

        for (index, pkg) in packages.iter().enumerate() {
            tracing::info!("[{}/{}] Checking {}", index + 1, total, pkg.pip);

            if checker.is_importable(&pkg.import_name)? {
                tracing::info!("Package {} already present.", pkg.pip);
                report.record(&pkg.pip, PackageStatus::AlreadyPresent);
                continue;
            }

            self.install(&pkg.pip)?;
            report.record(&pkg.pip, PackageStatus::Installed);
        }

        Ok(report)
    }
}
