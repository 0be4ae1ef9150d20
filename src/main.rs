//! Inkcut launcher entry point.

#![cfg_attr(windows, windows_subsystem = "windows")]

use std::path::Path;

use inkcut_launcher::config::{load_config, LauncherConfig};
use inkcut_launcher::logging::{LogSession, LOG_FILE_NAME};
use inkcut_launcher::runner::{base_dir, current_invocation, Outcome, SystemContext, Workflow};
use inkcut_launcher::shell::{is_elevated, SystemRunner};
use inkcut_launcher::ui::{dialog_title, NativeUI, UserInterface};
use inkcut_launcher::Result;

#[cfg(windows)]
use inkcut_launcher::runtime::WindowsRegistry as HostRegistry;
#[cfg(not(windows))]
use inkcut_launcher::runtime::NoRegistry as HostRegistry;

/// Open the log next to the executable, or in the temp directory if that
/// location is not writable.
fn open_log(dir: &Path) -> Result<LogSession> {
    LogSession::open(&dir.join(LOG_FILE_NAME))
        .or_else(|_| LogSession::open(&std::env::temp_dir().join(LOG_FILE_NAME)))
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn run(ui: &mut NativeUI, log: &mut LogSession, app_name: &mut String) -> Result<Outcome> {
    let (launcher_exe, args) = current_invocation()?;
    let config: LauncherConfig = load_config(&base_dir(&launcher_exe), env_var)?;
    *app_name = config.app_name.clone();

    let runner = SystemRunner::new();
    let registry = HostRegistry;
    let ctx = SystemContext {
        runner: &runner,
        registry: &registry,
        env: &env_var,
        elevated: is_elevated(),
        launcher_exe,
        args,
    };

    Workflow::new(&config, ctx).run(ui, log)
}

fn main() {
    let mut ui = NativeUI::new();
    let mut app_name = LauncherConfig::default().app_name;

    let dir = std::env::current_exe()
        .map(|exe| base_dir(&exe))
        .unwrap_or_else(|_| ".".into());
    let mut log = match open_log(&dir) {
        Ok(log) => log,
        Err(e) => {
            ui.error(
                &dialog_title(&app_name),
                &format!("{app_name} launcher error:\nUnable to open log file: {e}"),
            );
            std::process::exit(1);
        }
    };

    tracing::info!("{} launcher started.", app_name);

    let code = match run(&mut ui, &mut log, &mut app_name) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            // A failed relaunch happens after the log was handed off
            if let Err(log_err) = log.reopen() {
                eprintln!("Unable to reopen log file: {log_err}");
            }
            let message = e.to_string();
            tracing::error!("{} launcher failed: {:#}", app_name, anyhow::Error::from(e));
            ui.error(
                &dialog_title(&app_name),
                &format!("{app_name} launcher error:\n{message}"),
            );
            1
        }
    };

    log.close();
    std::process::exit(code);
}
