//! Host platform queries.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Check if running as root/admin.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(windows)]
    {
        // SAFETY: IsUserAnAdmin takes no arguments and only inspects the process token
        unsafe { windows_sys::Win32::UI::Shell::IsUserAnAdmin() != 0 }
    }

    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}

/// The host machine architecture, lowercased.
///
/// A 32-bit process on 64-bit Windows sees the real machine in
/// `PROCESSOR_ARCHITEW6432`; otherwise `PROCESSOR_ARCHITECTURE` applies.
/// Falls back to the compile target.
pub fn host_machine<F>(env_fn: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env_fn("PROCESSOR_ARCHITEW6432")
        .or_else(|| env_fn("PROCESSOR_ARCHITECTURE"))
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| env::consts::ARCH.to_string())
        .to_lowercase()
}

/// Installer filename suffix for a machine architecture.
pub fn installer_suffix(machine: &str) -> &'static str {
    let machine = machine.to_lowercase();
    if machine.contains("arm64") || machine.contains("aarch64") {
        "-arm64"
    } else if machine.contains("64") {
        "-amd64"
    } else {
        ""
    }
}

/// Find `exe_name` in the entries of a `PATH` value.
pub fn find_in_path(exe_name: &str, path_var: Option<&OsString>) -> Option<PathBuf> {
    let path_var = path_var?;
    env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(exe_name))
        .find(|candidate| candidate.is_file())
}

/// Put `dir` in front of an existing `PATH` value.
pub fn prepend_to_path(dir: &Path, path_var: Option<&OsString>) -> Option<OsString> {
    let mut entries = vec![dir.to_path_buf()];
    if let Some(existing) = path_var {
        entries.extend(env::split_paths(existing));
    }
    env::join_paths(entries).ok()
}

/// Whether two paths name the same file.
///
/// Paths that cannot be canonicalized are compared as given.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
