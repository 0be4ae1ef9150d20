//! Error types for launcher operations.
//!
//! This module defines [`LauncherError`], the error type used throughout
//! the launcher, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Expected non-findings (runtime absent, package not importable) are
//!   `Option::None` or `false`, never a `LauncherError`
//! - Operational failures carry the detail a user needs (URL, exit code, package)
//! - Everything propagates to the single top-level handler in `main`

use std::path::PathBuf;
use thiserror::Error;

/// One mirror that could not deliver the installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorFailure {
    /// The URL that was attempted.
    pub url: String,
    /// Why the attempt failed.
    pub reason: String,
}

/// Core error type for launcher operations.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Failed to parse the launcher configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A command could not be started at all.
    #[error("Failed to start {command}: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Every mirror failed to deliver the installer.
    #[error("Failed to download Python installer from all mirrors: {}", format_failures(.failures))]
    DownloadFailed { failures: Vec<MirrorFailure> },

    /// Every mirror failed and the user supplied no usable local installer.
    #[error(
        "Python installer was not provided by the user (expected {expected}); download failed from: {}",
        format_failures(.failures)
    )]
    InstallerNotProvided {
        expected: String,
        failures: Vec<MirrorFailure>,
    },

    /// The installer ran with our own privileges and failed.
    #[error("Python installer exited with code {}", format_code(.code))]
    InstallerFailed { code: Option<i32> },

    /// The installer ran through the elevation helper and failed.
    #[error("Elevated installer failed with code {}", format_code(.code))]
    ElevatedInstallerFailed { code: Option<i32> },

    /// The user declined the elevation prompt.
    #[error("Python installation canceled by user")]
    InstallCanceled,

    /// The installer finished but the runtime never became visible.
    #[error("Python {version} installation was not detected after setup (waited {waited_secs}s)")]
    RuntimeNotDetected { version: String, waited_secs: u64 },

    /// The resolved interpreter disappeared between checks.
    #[error("Python interpreter {} not found", .path.display())]
    InterpreterMissing { path: PathBuf },

    /// `pip install` returned a non-zero exit code.
    #[error("pip exited with code {} while installing {package}", format_code(.code))]
    PackageInstallFailed { package: String, code: Option<i32> },

    /// The target application exited during the grace period.
    #[error("{app} exited immediately with code {}", format_code(.code))]
    AppExitedImmediately { app: String, code: Option<i32> },

    /// Re-executing the launcher under the resolved runtime failed.
    #[error("Failed to relaunch with Python {version}: {message}")]
    RelaunchFailed { version: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for launcher operations.
pub type Result<T> = std::result::Result<T, LauncherError>;

fn format_failures(failures: &[MirrorFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.url, f.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown".to_string(),
    }
}
