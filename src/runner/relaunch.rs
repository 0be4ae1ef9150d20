//! Handing off to a fresh copy of the launcher.
//!
//! The copy gets the same arguments, the guard variable, and a `PATH` that
//! starts with the resolved runtime's directory, so the resolved runtime is
//! the active one inside it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{LauncherError, Result};
use crate::runtime::VersionTriple;
use crate::shell::{prepend_to_path, CommandSpec, ProcessRunner};

/// Set in the relaunched copy; a launcher that sees it never relaunches again.
pub const RELAUNCH_GUARD: &str = "INKCUT_LAUNCHER_RELAUNCHED";

/// Exit code reported when the relaunched copy ends without one.
const NO_EXIT_CODE: i32 = 1;

/// Whether `value` (the guard variable's value) marks a relaunched process.
pub fn guard_is_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Everything needed to start the copy.
#[derive(Debug, Clone)]
pub struct RelaunchRequest {
    /// The launcher executable
    pub launcher: PathBuf,
    /// Original arguments, program name excluded
    pub args: Vec<OsString>,
    /// The resolved runtime executable
    pub runtime: PathBuf,
}

impl RelaunchRequest {
    /// The command for the copy, given the current `PATH`.
    pub fn command(&self, path_var: Option<&OsString>) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.launcher)
            .args(self.args.iter().cloned())
            .env(RELAUNCH_GUARD, "1");

        if let Some(new_path) = self
            .runtime
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .and_then(|dir| prepend_to_path(dir, path_var))
        {
            spec = spec.env("PATH", new_path);
        }
        spec
    }

    /// Run the copy, wait for it, and return its exit code.
    pub fn run(
        &self,
        runner: &dyn ProcessRunner,
        path_var: Option<&OsString>,
        version: VersionTriple,
    ) -> Result<i32> {
        tracing::info!("Restarting launcher with {}", self.runtime.display());
        let code = runner
            .status(&self.command(path_var))
            .map_err(|e| LauncherError::RelaunchFailed {
                version: version.to_string(),
                message: e.to_string(),
            })?;
        Ok(code.unwrap_or(NO_EXIT_CODE))
    }
}

/// The running launcher executable and its arguments.
pub fn current_invocation() -> Result<(PathBuf, Vec<OsString>)> {
    let exe = std::env::current_exe()?;
    let args = std::env::args_os().skip(1).collect();
    Ok((exe, args))
}

/// Directory holding `exe`, falling back to the current directory.
pub fn base_dir(exe: &Path) -> PathBuf {
    exe.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{MockResponse, MockRunner};
    use std::env;

    fn request() -> RelaunchRequest {
        RelaunchRequest {
            launcher: PathBuf::from("/opt/launcher/inkcut-launcher"),
            args: vec![OsString::from("--flag"), OsString::from("file.svg")],
            runtime: PathBuf::from("/opt/python39/python"),
        }
    }

    #[test]
    fn guard_values() {
        assert!(guard_is_set(Some("1")));
        assert!(!guard_is_set(Some("")));
        assert!(!guard_is_set(None));
    }

    #[test]
    fn command_forwards_args_and_sets_guard() {
        let spec = request().command(None);
        assert_eq!(spec.program, PathBuf::from("/opt/launcher/inkcut-launcher"));
        assert_eq!(spec.args, vec![OsString::from("--flag"), OsString::from("file.svg")]);
        assert_eq!(spec.env_value(RELAUNCH_GUARD), Some(&OsString::from("1")));
    }

    #[test]
    fn command_prepends_runtime_dir_to_path() {
        let existing = env::join_paths(["/usr/bin"]).unwrap();
        let spec = request().command(Some(&existing));
        let path = spec.env_value("PATH").unwrap();
        let entries: Vec<PathBuf> = env::split_paths(path).collect();
        assert_eq!(
            entries,
            vec![PathBuf::from("/opt/python39"), PathBuf::from("/usr/bin")]
        );
    }

    #[test]
    fn run_returns_child_exit_code() {
        let runner = MockRunner::new();
        runner.on(|_| true, MockResponse::exit(7));
        let code = request()
            .run(&runner, None, VersionTriple::new(3, 9, 13))
            .unwrap();
        assert_eq!(code, 7);
    }

    #[test]
    fn spawn_failure_is_relaunch_failure() {
        let runner = MockRunner::new();
        runner.on(
            |_| true,
            MockResponse::SpawnError(std::io::ErrorKind::PermissionDenied),
        );
        let err = request()
            .run(&runner, None, VersionTriple::new(3, 9, 13))
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Failed to relaunch with Python 3.9.13"));
    }

    #[test]
    fn base_dir_is_parent() {
        assert_eq!(
            base_dir(Path::new("/opt/launcher/inkcut-launcher")),
            PathBuf::from("/opt/launcher")
        );
    }
}
