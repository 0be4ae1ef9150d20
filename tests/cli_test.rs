//! End-to-end tests of the launcher binary against a fake interpreter.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]
#![cfg(unix)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

/// Fake interpreter: reports 3.9.13, every import succeeds, and
/// `-m <module>` runs `app_body`.
fn install_fake_python(dir: &Path, app_body: &str) {
    let script = format!(
        "#!/bin/sh\ncase \"$1\" in\n  --version) echo \"Python 3.9.13\" ;;\n  -c) exit 0 ;;\n  -m) {app_body} ;;\n  *) exit 2 ;;\nesac\n"
    );
    let path = dir.join("python");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    let config = format!(
        r#"
runtime:
  executable: python
  registry_keys: []
  install_dirs: ["{}"]
  selector: null
installer:
  mirrors: ["http://127.0.0.1:9"]
  poll_interval_secs: 0
  timeout_secs: 0
launch:
  grace_period_ms: 300
"#,
        dir.display()
    );
    let path = dir.join("launcher.yml");
    fs::write(&path, config).unwrap();
    path
}

fn launcher(dir: &Path) -> Command {
    let path_var = std::env::join_paths(
        std::iter::once(dir.to_path_buf())
            .chain(std::env::split_paths(&std::env::var_os("PATH").unwrap_or_default())),
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin("inkcut-launcher"));
    cmd.env("PATH", path_var)
        .env("INKCUT_LAUNCHER_CONFIG", write_config(dir))
        .env_remove("INKCUT_LAUNCHER_RELAUNCHED")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn launches_app_when_everything_is_present() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    install_fake_python(temp.path(), "sleep 2");

    launcher(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Required Python version already active: 3.9.13"))
        .stdout(predicate::str::contains("[1/2] Checking pyqt5"))
        .stdout(predicate::str::contains("Inkcut started successfully"));
    Ok(())
}

#[test]
fn app_exiting_at_once_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    install_fake_python(temp.path(), "exit 1");

    launcher(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Inkcut launcher error:"))
        .stderr(predicate::str::contains("exited immediately with code 1"));
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let config = temp.path().join("broken.yml");
    fs::write(&config, "launch:\n  module: \"\"\n")?;

    Command::new(cargo_bin("inkcut-launcher"))
        .env("INKCUT_LAUNCHER_CONFIG", &config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid configuration"));
    Ok(())
}
