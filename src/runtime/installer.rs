//! Obtaining and installing the required runtime.
//!
//! Installation is a single attempt:
//! 1. Download the official installer from the first mirror that delivers it,
//!    or ask the user for a local copy when none does
//! 2. Run it unattended, through an elevation prompt when not already elevated
//! 3. Poll the locator until the new runtime is visible

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use crate::config::LauncherConfig;
use crate::error::{LauncherError, MirrorFailure, Result};
use crate::runtime::{HttpDownloader, RuntimeLocator};
use crate::shell::{host_machine, installer_suffix, CommandSpec, ProcessRunner};
use crate::ui::{dialog_title, native::ps_quote, UserInterface};

/// Windows `ERROR_CANCELLED`: the user declined the elevation prompt.
pub const ERROR_CANCELLED: i32 = 1223;

/// Prefix of the per-attempt temporary directory.
pub const TEMP_DIR_PREFIX: &str = "inkcut_python_";

/// Downloads, runs and verifies the runtime installer.
pub struct RuntimeInstaller<'a> {
    config: &'a LauncherConfig,
    runner: &'a dyn ProcessRunner,
    locator: &'a RuntimeLocator<'a>,
    env: &'a dyn Fn(&str) -> Option<String>,
    elevated: bool,
}

impl<'a> RuntimeInstaller<'a> {
    pub fn new(
        config: &'a LauncherConfig,
        runner: &'a dyn ProcessRunner,
        locator: &'a RuntimeLocator<'a>,
        env: &'a dyn Fn(&str) -> Option<String>,
        elevated: bool,
    ) -> Self {
        Self {
            config,
            runner,
            locator,
            env,
            elevated,
        }
    }

    /// `python-<version><suffix>.exe` for the host architecture.
    pub fn installer_filename(&self) -> String {
        let machine = host_machine(self.env);
        format!(
            "python-{}{}.exe",
            self.config.runtime.version,
            installer_suffix(&machine)
        )
    }

    /// Download URLs in mirror order, without duplicates.
    pub fn mirror_urls(&self) -> Vec<String> {
        let version = self.config.runtime.version;
        let filename = self.installer_filename();
        let mut urls: Vec<String> = Vec::new();
        for base in &self.config.installer.mirrors {
            let base = base.trim().trim_end_matches('/');
            if base.is_empty() {
                continue;
            }
            let url = format!("{base}/{version}/{filename}");
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }

    /// Try each mirror in order until one delivers the installer to `dest`.
    pub fn download(&self, downloader: &HttpDownloader, dest: &Path) -> Result<PathBuf> {
        let version = self.config.runtime.version;
        let mut failures = Vec::new();

        for url in self.mirror_urls() {
            tracing::info!("Downloading Python {} from {}", version, url);
            match downloader.download(&url, dest) {
                Ok(_) => {
                    tracing::info!("Python installer saved to {}", dest.display());
                    return Ok(dest.to_path_buf());
                }
                Err(e) => {
                    tracing::warn!("Download from {} failed: {:#}", url, e);
                    failures.push(MirrorFailure {
                        url,
                        reason: format!("{e:#}"),
                    });
                }
            }
        }

        Err(LauncherError::DownloadFailed { failures })
    }

    /// Ask the user for a local copy of the installer.
    ///
    /// The chosen file must exist and carry the expected name (compared
    /// case-insensitively).
    pub fn prompt_for_local(&self, ui: &mut dyn UserInterface) -> Option<PathBuf> {
        let expected = self.installer_filename();
        let title = dialog_title(&self.config.app_name);
        ui.info(
            &title,
            &format!(
                "Unable to download Python {} automatically.\nClick OK and select {}.",
                self.config.runtime.version, expected
            ),
        );

        let Some(selected) = ui.select_file("Select Python installer", &expected) else {
            tracing::warn!("User canceled installer selection.");
            return None;
        };

        if !selected.is_file() {
            tracing::error!("Installer {} does not exist.", selected.display());
            return None;
        }

        let name = selected
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !name.eq_ignore_ascii_case(&expected) {
            tracing::error!("Selected {}, expected {}.", name, expected);
            return None;
        }

        Some(selected)
    }

    /// Obtain an installer: download into `dest_dir`, else ask the user.
    pub fn acquire(
        &self,
        downloader: &HttpDownloader,
        dest_dir: &Path,
        ui: &mut dyn UserInterface,
    ) -> Result<PathBuf> {
        let dest = dest_dir.join(self.installer_filename());
        match self.download(downloader, &dest) {
            Ok(path) => Ok(path),
            Err(LauncherError::DownloadFailed { failures }) => {
                tracing::error!("Automatic download failed for all mirrors.");
                self.prompt_for_local(ui)
                    .ok_or_else(|| LauncherError::InstallerNotProvided {
                        expected: self.installer_filename(),
                        failures,
                    })
            }
            Err(other) => Err(other),
        }
    }

    /// Command that runs the installer through the elevation prompt.
    ///
    /// The script exits with the installer's exit code, or with the Win32
    /// error code when elevation itself fails.
    pub fn elevated_command(&self, installer: &Path) -> CommandSpec {
        let arguments = self
            .config
            .installer
            .arguments
            .iter()
            .map(|a| ps_quote(a))
            .collect::<Vec<_>>()
            .join(",");
        let script = format!(
            "try {{ $p = Start-Process -FilePath {} -ArgumentList @({}) -Verb RunAs -Wait -PassThru -ErrorAction Stop; exit $p.ExitCode }} \
             catch {{ $e = $_.Exception; while ($e -and -not ($e -is [System.ComponentModel.Win32Exception])) {{ $e = $e.InnerException }}; \
             if ($e) {{ exit $e.NativeErrorCode }}; exit 1 }}",
            ps_quote(&installer.to_string_lossy()),
            arguments
        );
        CommandSpec::new("powershell")
            .args(["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-Command"])
            .arg(script)
    }

    /// Run the installer unattended.
    pub fn install(&self, installer: &Path) -> Result<()> {
        tracing::info!("Installing Python {}...", self.config.runtime.version);

        if self.elevated {
            let spec = CommandSpec::new(installer).args(&self.config.installer.arguments);
            let code = self.runner.status(&spec)?;
            if code != Some(0) {
                return Err(LauncherError::InstallerFailed { code });
            }
        } else {
            let code = self.runner.status(&self.elevated_command(installer))?;
            match code {
                Some(0) => {}
                Some(ERROR_CANCELLED) => return Err(LauncherError::InstallCanceled),
                code => return Err(LauncherError::ElevatedInstallerFailed { code }),
            }
        }

        tracing::info!("Python installation finished.");
        Ok(())
    }

    /// Poll the locator until the runtime appears or the timeout elapses.
    ///
    /// The locator is always consulted at least once. A timeout too large
    /// to represent as an instant means polling never gives up.
    pub fn wait_until_visible(&self) -> Option<PathBuf> {
        tracing::info!("Validating Python installation...");
        let interval = self.config.installer.poll_interval();
        let deadline = Instant::now().checked_add(self.config.installer.timeout());

        loop {
            if let Some(found) = self.locator.locate() {
                tracing::info!("Validated Python at {}", found.display());
                return Some(found);
            }
            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    interval.min(deadline - now)
                }
                None => interval,
            };
            thread::sleep(pause);
        }
    }

    /// Acquire, install and verify the runtime, returning its path.
    ///
    /// The temporary download directory is removed on every path out.
    pub fn install_runtime(&self, ui: &mut dyn UserInterface) -> Result<PathBuf> {
        let workspace = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir()?;
        let workspace_path = workspace.path().to_path_buf();

        let result = self.install_in(&workspace_path, ui);

        if let Err(e) = workspace.close() {
            tracing::warn!("Unable to remove {}: {}", workspace_path.display(), e);
        }
        result
    }

    fn install_in(&self, workspace: &Path, ui: &mut dyn UserInterface) -> Result<PathBuf> {
        let downloader = HttpDownloader::new()?;
        let installer = self.acquire(&downloader, workspace, ui)?;
        self.install(&installer)?;
        self.wait_until_visible()
            .ok_or_else(|| LauncherError::RuntimeNotDetected {
                version: self.config.runtime.version.to_string(),
                waited_secs: self.config.installer.timeout_secs,
            })
    }
}
