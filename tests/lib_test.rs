//! Library integration tests.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use httpmock::prelude::*;
use inkcut_launcher::config::{parse_config, LauncherConfig, RuntimeConfig};
use inkcut_launcher::logging::LogSession;
use inkcut_launcher::runner::{Outcome, SystemContext, Workflow};
use inkcut_launcher::runtime::NoRegistry;
use inkcut_launcher::shell::{CommandSpec, MockResponse, MockRunner};
use inkcut_launcher::ui::MockUI;
use inkcut_launcher::LauncherError;
use tempfile::TempDir;

const INSTALLER_NAME: &str = "python-3.9.13-amd64.exe";

#[test]
fn error_types_are_public() {
    let err = LauncherError::InstallCanceled;
    assert_eq!(err.to_string(), "Python installation canceled by user");
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> inkcut_launcher::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn config_overrides_merge_with_defaults() {
    let yaml = r#"
runtime:
  version: 3.9.13
launch:
  grace_period_ms: 250
"#;
    let config = parse_config(yaml, Path::new("launcher.yml")).unwrap();

    assert_eq!(config.launch.grace_period_ms, 250);
    assert_eq!(config.launch.module, "inkcut");
    assert_eq!(config.packages, LauncherConfig::default().packages);
}

/// A machine with no Python yet, an install directory the fake installer
/// fills in, and three mirrors of which only the last one works.
struct Machine {
    temp: TempDir,
    config: LauncherConfig,
    runner: MockRunner,
    vars: HashMap<String, String>,
}

impl Machine {
    fn new(mirrors: Vec<String>) -> Self {
        let temp = TempDir::new().unwrap();
        let install_dir = temp.path().join("Python39");

        let mut config = LauncherConfig::default();
        config.runtime = RuntimeConfig {
            executable: "python".to_string(),
            registry_keys: vec![],
            install_dirs: vec![install_dir.clone()],
            user_install_dir: None,
            selector: None,
            ..RuntimeConfig::default()
        };
        config.installer.mirrors = mirrors;
        config.installer.poll_interval_secs = 0;
        config.installer.timeout_secs = 0;
        config.launch.grace_period_ms = 0;

        let runner = MockRunner::new();
        let python = install_dir.join("python");
        let probed = python.clone();
        runner.on(
            move |spec| spec.program == probed && spec.has_arg("--version"),
            MockResponse::output(0, "Python 3.9.13"),
        );
        runner.on_with(is_installer, move |_| {
            fs::create_dir_all(python.parent().unwrap()).unwrap();
            fs::write(&python, "").unwrap();
            MockResponse::success()
        });
        runner.on(|spec| spec.has_arg("-c"), MockResponse::success());
        runner.on(
            |spec| spec.has_arg("-m") && spec.has_arg("inkcut"),
            MockResponse::Running,
        );

        let mut vars = HashMap::new();
        vars.insert("PROCESSOR_ARCHITECTURE".to_string(), "AMD64".to_string());

        Self {
            temp,
            config,
            runner,
            vars,
        }
    }

    fn run(&self) -> inkcut_launcher::Result<Outcome> {
        let vars = self.vars.clone();
        let env = move |key: &str| vars.get(key).cloned();
        let ctx = SystemContext {
            runner: &self.runner,
            registry: &NoRegistry,
            env: &env,
            elevated: true,
            launcher_exe: PathBuf::from("/opt/launcher/inkcut-launcher"),
            args: Vec::<OsString>::new(),
        };
        let mut log =
            LogSession::open_with(&self.temp.path().join("launcher.log"), false).unwrap();
        let outcome = Workflow::new(&self.config, ctx).run(&mut MockUI::new(), &mut log);
        log.close();
        outcome
    }

    fn log(&self) -> String {
        fs::read_to_string(self.temp.path().join("launcher.log")).unwrap()
    }
}

fn is_installer(spec: &CommandSpec) -> bool {
    spec.program.file_name().is_some_and(|name| name == INSTALLER_NAME)
}

#[test]
fn fresh_machine_installs_from_first_working_mirror() {
    let server = MockServer::start();
    let broken = server.mock(|when, then| {
        when.method(GET).path("/one/3.9.13/python-3.9.13-amd64.exe");
        then.status(404);
    });
    let also_broken = server.mock(|when, then| {
        when.method(GET).path("/two/3.9.13/python-3.9.13-amd64.exe");
        then.status(500);
    });
    let working = server.mock(|when, then| {
        when.method(GET).path("/three/3.9.13/python-3.9.13-amd64.exe");
        then.status(200).body("MZ installer bytes");
    });

    let machine = Machine::new(vec![
        server.url("/one"),
        server.url("/two"),
        server.url("/three"),
    ]);

    let outcome = machine.run().unwrap();

    broken.assert();
    also_broken.assert();
    working.assert();

    let installed = machine.temp.path().join("Python39").join("python");
    assert!(matches!(outcome, Outcome::Launched { ref runtime, .. } if *runtime == installed));
    assert_eq!(machine.runner.call_count(is_installer), 1);

    let installer_call = machine
        .runner
        .calls()
        .into_iter()
        .find(is_installer)
        .unwrap();
    assert!(installer_call.has_arg("/quiet"));
    assert!(installer_call.has_arg("PrependPath=1"));

    let log = machine.log();
    assert_eq!(log.matches("[WARN] Download from").count(), 2);
    assert!(log.contains("Inkcut started successfully"));

    // The per-attempt download directory is gone
    assert!(!installer_call.program.parent().unwrap().exists());
}

#[test]
fn second_run_downloads_and_installs_nothing() {
    let server = MockServer::start();
    let mirror = server.mock(|when, then| {
        when.method(GET).path("/3.9.13/python-3.9.13-amd64.exe");
        then.status(200).body("MZ installer bytes");
    });

    let machine = Machine::new(vec![server.url("/")]);

    machine.run().unwrap();
    mirror.assert_calls(1);

    machine.run().unwrap();
    mirror.assert_calls(1);
    assert_eq!(machine.runner.call_count(is_installer), 1);
    assert_eq!(machine.runner.call_count(|spec| spec.has_arg("pip")), 0);
}

#[test]
fn all_mirrors_failing_without_local_installer_is_an_error() {
    let server = MockServer::start();
    let mirror = server.mock(|when, then| {
        when.method(GET).path("/3.9.13/python-3.9.13-amd64.exe");
        then.status(404);
    });

    let machine = Machine::new(vec![server.url("/")]);
    let err = machine.run().unwrap_err();

    mirror.assert();
    match err {
        LauncherError::InstallerNotProvided { expected, failures } => {
            assert_eq!(expected, INSTALLER_NAME);
            assert_eq!(failures.len(), 1);
            assert!(failures[0].url.starts_with(&server.url("/3.9.13/")));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(machine.runner.call_count(is_installer), 0);
}
