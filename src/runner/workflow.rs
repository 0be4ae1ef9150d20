//! Launcher orchestration.
//!
//! One run moves through these states, strictly in order:
//! resolving the runtime, relaunching if needed, reconciling packages,
//! launching the application. The only fork is the relaunch, after which
//! this process just waits for its copy and reports the copy's exit code.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::LauncherConfig;
use crate::error::Result;
use crate::logging::LogSession;
use crate::requirements::{PackageReconciler, ReconcileReport};
use crate::runtime::{ActiveRuntime, RegistryLookup, RuntimeInstaller, RuntimeLocator};
use crate::shell::{same_file, ProcessRunner};
use crate::ui::UserInterface;

use super::launch::ProcessLauncher;
use super::relaunch::{guard_is_set, RelaunchRequest, RELAUNCH_GUARD};

/// Host services the workflow runs against.
pub struct SystemContext<'a> {
    pub runner: &'a dyn ProcessRunner,
    pub registry: &'a dyn RegistryLookup,
    /// Environment variable lookup
    pub env: &'a dyn Fn(&str) -> Option<String>,
    /// Whether this process already has administrator rights
    pub elevated: bool,
    /// This launcher's executable, for relaunching
    pub launcher_exe: PathBuf,
    /// This launcher's arguments, program name excluded
    pub args: Vec<OsString>,
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The application is running.
    Launched {
        runtime: PathBuf,
        pid: u32,
        packages: ReconcileReport,
    },
    /// A relaunched copy did the work; this is its exit code.
    Relaunched { exit_code: i32 },
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Launched { .. } => 0,
            Outcome::Relaunched { exit_code } => *exit_code,
        }
    }
}

/// Where the runtime came from.
struct Resolution {
    path: PathBuf,
    active: Option<ActiveRuntime>,
    already_active: bool,
}

/// Runs the whole launch sequence.
pub struct Workflow<'a> {
    config: &'a LauncherConfig,
    ctx: SystemContext<'a>,
}

impl<'a> Workflow<'a> {
    pub fn new(config: &'a LauncherConfig, ctx: SystemContext<'a>) -> Self {
        Self { config, ctx }
    }

    fn locator(&self) -> RuntimeLocator<'_> {
        RuntimeLocator::new(
            &self.config.runtime,
            self.ctx.runner,
            self.ctx.registry,
            self.ctx.env,
        )
    }

    /// Run the sequence.
    ///
    /// `log` is closed before handing off to a relaunched copy so the copy
    /// can append to the same file.
    pub fn run(&self, ui: &mut dyn UserInterface, log: &mut LogSession) -> Result<Outcome> {
        let resolution = self.resolve_runtime(ui)?;

        if let Some(exit_code) = self.relaunch_if_needed(&resolution, log)? {
            return Ok(Outcome::Relaunched { exit_code });
        }

        let runtime = resolution.path;
        tracing::info!("Python interpreter selected: {}", runtime.display());

        let packages =
            PackageReconciler::new(self.ctx.runner, &runtime).reconcile(&self.config.packages)?;

        let pid = ProcessLauncher::new(
            self.ctx.runner,
            &self.config.app_name,
            self.config.launch.grace_period(),
        )
        .launch(&runtime, &self.config.launch.module)?;

        tracing::info!("{} launcher finished successfully.", self.config.app_name);
        Ok(Outcome::Launched {
            runtime,
            pid,
            packages,
        })
    }

    fn resolve_runtime(&self, ui: &mut dyn UserInterface) -> Result<Resolution> {
        let required = self.config.runtime.version;
        let locator = self.locator();
        let active = locator.active_runtime();

        match &active {
            Some(current) if current.version == Some(required) => {
                tracing::info!("Required Python version already active: {}", required);
                return Ok(Resolution {
                    path: current.path.clone(),
                    active: active.clone(),
                    already_active: true,
                });
            }
            Some(current) => tracing::warn!(
                "Python {} is required, but current interpreter is {}.",
                required,
                current
                    .version
                    .map_or_else(|| "unknown".to_string(), |v| v.to_string())
            ),
            None => tracing::info!("No Python interpreter on PATH."),
        }

        let path = match locator.locate() {
            Some(found) => {
                tracing::info!("Found required Python at {}", found.display());
                found
            }
            None => {
                tracing::info!(
                    "Python {} is not installed; proceeding with installation.",
                    required
                );
                RuntimeInstaller::new(
                    self.config,
                    self.ctx.runner,
                    &locator,
                    self.ctx.env,
                    self.ctx.elevated,
                )
                .install_runtime(ui)?
            }
        };

        Ok(Resolution {
            path,
            active,
            already_active: false,
        })
    }

    /// Relaunch under the resolved runtime when another one is active.
    ///
    /// Returns the copy's exit code, or `None` to continue in this process.
    fn relaunch_if_needed(
        &self,
        resolution: &Resolution,
        log: &mut LogSession,
    ) -> Result<Option<i32>> {
        if resolution.already_active {
            return Ok(None);
        }
        let Some(active) = &resolution.active else {
            return Ok(None);
        };
        if same_file(&active.path, &resolution.path) {
            return Ok(None);
        }

        if guard_is_set((self.ctx.env)(RELAUNCH_GUARD).as_deref()) {
            tracing::warn!(
                "Already relaunched once; continuing with {} instead of relaunching again.",
                resolution.path.display()
            );
            return Ok(None);
        }

        let request = RelaunchRequest {
            launcher: self.ctx.launcher_exe.clone(),
            args: self.ctx.args.clone(),
            runtime: resolution.path.clone(),
        };
        let path_var = (self.ctx.env)("PATH").map(OsString::from);

        tracing::info!("Handing off to {}", resolution.path.display());
        log.close();
        let exit_code = request.run(self.ctx.runner, path_var.as_ref(), self.config.runtime.version)?;
        Ok(Some(exit_code))
    }
}
