//! Locating an installed runtime of the required version.
//!
//! Candidates come from, in order:
//! 1. Registry `InstallPath` keys
//! 2. Well-known install directories
//! 3. The per-user install directory under `%LOCALAPPDATA%`
//! 4. The version selector (`py -X.Y`)
//!
//! The selector is only invoked when the static sources produced no match.
//! Nothing is cached: every call re-reads the registry and re-runs the
//! selector, so polling after an install sees the new state.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::RuntimeConfig;
use crate::runtime::{VersionProbe, VersionTriple};
use crate::shell::{find_in_path, CommandSpec, ProcessRunner};

/// Reads install directories from the system registry.
pub trait RegistryLookup {
    /// The default value of `HKEY_LOCAL_MACHINE\<subkey>`, if readable.
    fn install_path(&self, subkey: &str) -> Option<PathBuf>;
}

/// Registry stand-in for hosts without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRegistry;

impl RegistryLookup for NoRegistry {
    fn install_path(&self, _subkey: &str) -> Option<PathBuf> {
        None
    }
}

/// The Windows registry, read through `winreg`.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsRegistry;

#[cfg(windows)]
impl RegistryLookup for WindowsRegistry {
    fn install_path(&self, subkey: &str) -> Option<PathBuf> {
        use winreg::enums::HKEY_LOCAL_MACHINE;
        use winreg::RegKey;

        let key = RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey(subkey).ok()?;
        let dir: String = key.get_value("").ok()?;
        Some(PathBuf::from(dir))
    }
}

/// The interpreter found first on `PATH`, which child processes would get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRuntime {
    pub path: PathBuf,
    pub version: Option<VersionTriple>,
}

/// Finds an installed runtime matching the required version exactly.
pub struct RuntimeLocator<'a> {
    settings: &'a RuntimeConfig,
    runner: &'a dyn ProcessRunner,
    registry: &'a dyn RegistryLookup,
    env: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> RuntimeLocator<'a> {
    pub fn new(
        settings: &'a RuntimeConfig,
        runner: &'a dyn ProcessRunner,
        registry: &'a dyn RegistryLookup,
        env: &'a dyn Fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            settings,
            runner,
            registry,
            env,
        }
    }

    pub fn required(&self) -> VersionTriple {
        self.settings.version
    }

    /// Candidate executables from the registry and fixed directories.
    ///
    /// Candidates are not checked for existence here.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let exe = &self.settings.executable;
        let mut candidates: Vec<PathBuf> = self
            .settings
            .registry_keys
            .iter()
            .filter_map(|key| self.registry.install_path(key))
            .map(|dir| dir.join(exe))
            .collect();

        candidates.extend(self.settings.install_dirs.iter().map(|dir| dir.join(exe)));

        if let (Some(local), Some(user_dir)) = (
            (self.env)("LOCALAPPDATA").filter(|v| !v.is_empty()),
            &self.settings.user_install_dir,
        ) {
            candidates.push(PathBuf::from(local).join(user_dir).join(exe));
        }

        candidates
    }

    /// Ask the version selector where the required `X.Y` lives.
    fn selector_candidate(&self) -> Option<PathBuf> {
        let selector = self.settings.selector.as_deref()?;
        let spec = CommandSpec::new(selector)
            .arg(format!("-{}", self.required().major_minor()))
            .args(["-c", "import sys; print(sys.executable)"]);

        let result = self.runner.output(&spec).ok()?;
        if !result.success {
            return None;
        }
        let printed = result.stdout.trim();
        if printed.is_empty() {
            None
        } else {
            Some(PathBuf::from(printed))
        }
    }

    fn matches(&self, probe: &VersionProbe<'_>, candidate: &Path) -> bool {
        candidate.exists() && probe.probe(candidate) == Some(self.required())
    }

    /// The first existing candidate whose version equals the requirement.
    pub fn locate(&self) -> Option<PathBuf> {
        let probe = VersionProbe::new(self.runner);

        if let Some(found) = self
            .candidates()
            .into_iter()
            .find(|candidate| self.matches(&probe, candidate))
        {
            tracing::debug!("Found Python {} at {}", self.required(), found.display());
            return Some(found);
        }

        self.selector_candidate()
            .filter(|candidate| self.matches(&probe, candidate))
    }

    /// The interpreter `PATH` resolves to, with its probed version.
    pub fn active_runtime(&self) -> Option<ActiveRuntime> {
        let path_var = (self.env)("PATH").map(OsString::from);
        let path = find_in_path(&self.settings.executable, path_var.as_ref())?;
        let version = VersionProbe::new(self.runner).probe(&path);
        Some(ActiveRuntime { path, version })
    }
}
