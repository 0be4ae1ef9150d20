//! Configuration schema definitions for the launcher.
//!
//! Every struct here maps onto a section of `launcher.yml`. All sections are
//! optional; `Default` carries the Inkcut setup, so an absent file and an
//! empty file behave the same.

use crate::runtime::VersionTriple;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for launcher.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Application name (dialog titles, log lines)
    pub app_name: String,

    /// Which runtime is required and where to look for it
    pub runtime: RuntimeConfig,

    /// How to obtain and run the runtime installer
    pub installer: InstallerConfig,

    /// Packages that must be importable under the runtime
    pub packages: Vec<PackageRequirement>,

    /// How to start the target application
    pub launch: LaunchConfig,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            app_name: "Inkcut".to_string(),
            runtime: RuntimeConfig::default(),
            installer: InstallerConfig::default(),
            packages: vec![
                PackageRequirement::new("pyqt5", "PyQt5"),
                PackageRequirement::new("inkcut", "inkcut"),
            ],
            launch: LaunchConfig::default(),
        }
    }
}

/// Required runtime and its search locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Exact version that must be found
    pub version: VersionTriple,

    /// Interpreter file name inside an install directory
    pub executable: String,

    /// `HKEY_LOCAL_MACHINE` subkeys whose default value is an install directory
    pub registry_keys: Vec<String>,

    /// Well-known install directories, checked in order
    pub install_dirs: Vec<PathBuf>,

    /// Per-user install directory, relative to `%LOCALAPPDATA%`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_install_dir: Option<PathBuf>,

    /// Version selector helper (`py -X.Y`), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            version: VersionTriple::new(3, 9, 13),
            executable: default_executable().to_string(),
            registry_keys: vec![
                r"SOFTWARE\Python\PythonCore\3.9\InstallPath".to_string(),
                r"SOFTWARE\WOW6432Node\Python\PythonCore\3.9\InstallPath".to_string(),
            ],
            install_dirs: vec![
                PathBuf::from(r"C:\Program Files\Python39"),
                PathBuf::from(r"C:\Program Files (x86)\Python39"),
            ],
            user_install_dir: Some(PathBuf::from(r"Programs\Python\Python39")),
            selector: Some("py".to_string()),
        }
    }
}

fn default_executable() -> &'static str {
    if cfg!(windows) {
        "python.exe"
    } else {
        "python"
    }
}

/// Installer download and execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Mirror base URLs; the installer lives at `{base}/{version}/{filename}`
    pub mirrors: Vec<String>,

    /// Arguments for an unattended install
    pub arguments: Vec<String>,

    /// Seconds between detection polls after the installer exits
    pub poll_interval_secs: u64,

    /// Seconds to wait for the runtime to become visible
    pub timeout_secs: u64,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            mirrors: vec![
                "https://www.python.org/ftp/python".to_string(),
                "https://download.python.org/ftp/python".to_string(),
                "https://mirrors.huaweicloud.com/python".to_string(),
            ],
            arguments: [
                "/quiet",
                "InstallAllUsers=1",
                "PrependPath=1",
                "Include_test=0",
                "Include_launcher=0",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            poll_interval_secs: 5,
            timeout_secs: 300,
        }
    }
}

impl InstallerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// A package the target application needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRequirement {
    /// Name passed to `pip install`
    pub pip: String,

    /// Module name probed with `import`
    #[serde(rename = "import")]
    pub import_name: String,
}

impl PackageRequirement {
    pub fn new(pip: &str, import_name: &str) -> Self {
        Self {
            pip: pip.to_string(),
            import_name: import_name.to_string(),
        }
    }
}

/// Target application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Module run with `-m`
    pub module: String,

    /// How long the application must survive to count as started
    pub grace_period_ms: u64,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            module: "inkcut".to_string(),
            grace_period_ms: 2000,
        }
    }
}

impl LaunchConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}
