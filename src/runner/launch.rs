//! Starting the target application.

use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::{LauncherError, Result};
use crate::shell::{ChildState, CommandSpec, ProcessRunner};

/// Starts `<interpreter> -m <module>` and checks that it stays up.
pub struct ProcessLauncher<'a> {
    runner: &'a dyn ProcessRunner,
    app_name: &'a str,
    grace_period: Duration,
}

impl<'a> ProcessLauncher<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, app_name: &'a str, grace_period: Duration) -> Self {
        Self {
            runner,
            app_name,
            grace_period,
        }
    }

    pub fn command(interpreter: &Path, module: &str) -> CommandSpec {
        CommandSpec::new(interpreter).arg("-m").arg(module)
    }

    /// Start the application detached and return its PID.
    ///
    /// An application that exits within the grace period is a launch
    /// failure, whatever its exit code. After that the child is left alone.
    pub fn launch(&self, interpreter: &Path, module: &str) -> Result<u32> {
        tracing::info!("Launching {}...", self.app_name);
        let mut child = self
            .runner
            .spawn_detached(&Self::command(interpreter, module))?;

        thread::sleep(self.grace_period);

        match child.try_wait()? {
            ChildState::Running => {
                let pid = child.id();
                tracing::info!("{} started successfully (PID {}).", self.app_name, pid);
                Ok(pid)
            }
            ChildState::Exited(code) => Err(LauncherError::AppExitedImmediately {
                app: self.app_name.to_string(),
                code,
            }),
        }
    }
}
