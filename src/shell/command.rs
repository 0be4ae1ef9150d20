//! Process execution.
//!
//! Everything the launcher runs (the interpreter, pip, the installer,
//! PowerShell, the relaunched launcher) goes through [`ProcessRunner`] so
//! the orchestration can be exercised against [`MockRunner`](super::MockRunner).

use crate::error::{LauncherError, Result};
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Suppresses the console window of console children of a GUI process.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;
#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

/// A program invocation: executable, arguments and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Variables set on top of the inherited environment.
    pub env: Vec<(OsString, OsString)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Whether any argument equals `arg`.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// The value this command sets for `key`, if any.
    pub fn env_value(&self, key: &str) -> Option<&OsString> {
        self.env.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Human-readable command line for logs and errors.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Result of running a command to completion with captured output.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    pub stdout: String,

    pub stderr: String,

    pub duration: Duration,

    /// Whether the command exited with code 0.
    pub success: bool,
}

impl CommandResult {
    pub fn new(exit_code: Option<i32>, stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: exit_code == Some(0),
        }
    }

    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Output line from a streamed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

impl OutputLine {
    pub fn text(&self) -> &str {
        match self {
            OutputLine::Stdout(s) | OutputLine::Stderr(s) => s,
        }
    }
}

/// Liveness of a detached child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Running,
    Exited(Option<i32>),
}

/// A started child process the launcher may poll once and then forget.
pub trait ChildProcess {
    fn id(&self) -> u32;

    fn try_wait(&mut self) -> Result<ChildState>;
}

/// Runs external programs.
pub trait ProcessRunner {
    /// Run to completion, capturing stdout and stderr.
    fn output(&self, spec: &CommandSpec) -> Result<CommandResult>;

    /// Run to completion with inherited stdio, returning the exit code.
    fn status(&self, spec: &CommandSpec) -> Result<Option<i32>>;

    /// Run to completion, handing every output line to `on_line` as it arrives.
    fn stream(
        &self,
        spec: &CommandSpec,
        on_line: &mut dyn FnMut(OutputLine),
    ) -> Result<CommandResult>;

    /// Start without waiting, with null stdio, detached from this process.
    fn spawn_detached(&self, spec: &CommandSpec) -> Result<Box<dyn ChildProcess>>;
}

/// [`ProcessRunner`] backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn spawn_error(spec: &CommandSpec, source: std::io::Error) -> LauncherError {
        LauncherError::CommandSpawn {
            command: spec.display(),
            source,
        }
    }
}

#[cfg(windows)]
fn hide_window(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_window(_cmd: &mut Command) {}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(windows))]
fn detach(_cmd: &mut Command) {}

/// Read a pipe to the end, forwarding each line and returning the full text.
///
/// Lines are decoded lossily so a stray non-UTF-8 byte does not end the pump.
fn pump<R: Read>(
    reader: R,
    tx: mpsc::Sender<OutputLine>,
    wrap: fn(String) -> OutputLine,
) -> String {
    let mut reader = BufReader::new(reader);
    let mut output = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                output.push_str(&line);
                output.push('\n');
                let _ = tx.send(wrap(line));
            }
        }
    }
    output
}

impl ProcessRunner for SystemRunner {
    fn output(&self, spec: &CommandSpec) -> Result<CommandResult> {
        let start = Instant::now();
        let mut cmd = spec.to_command();
        cmd.stdin(Stdio::null());
        hide_window(&mut cmd);

        let output = cmd.output().map_err(|e| Self::spawn_error(spec, e))?;

        Ok(CommandResult::new(
            output.status.code(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            start.elapsed(),
        ))
    }

    fn status(&self, spec: &CommandSpec) -> Result<Option<i32>> {
        let mut cmd = spec.to_command();
        hide_window(&mut cmd);
        let status = cmd.status().map_err(|e| Self::spawn_error(spec, e))?;
        Ok(status.code())
    }

    fn stream(
        &self,
        spec: &CommandSpec,
        on_line: &mut dyn FnMut(OutputLine),
    ) -> Result<CommandResult> {
        let start = Instant::now();
        let mut cmd = spec.to_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        hide_window(&mut cmd);

        let mut child = cmd.spawn().map_err(|e| Self::spawn_error(spec, e))?;

        let (tx, rx) = mpsc::channel();
        let stdout_handle = child.stdout.take().map(|stdout| {
            let tx = tx.clone();
            thread::spawn(move || pump(stdout, tx, OutputLine::Stdout))
        });
        let stderr_handle = child.stderr.take().map(|stderr| {
            let tx = tx.clone();
            thread::spawn(move || pump(stderr, tx, OutputLine::Stderr))
        });
        drop(tx);

        for line in rx {
            on_line(line);
        }

        let stdout_output = stdout_handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        let stderr_output = stderr_handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        let status = child.wait()?;

        Ok(CommandResult::new(
            status.code(),
            stdout_output,
            stderr_output,
            start.elapsed(),
        ))
    }

    fn spawn_detached(&self, spec: &CommandSpec) -> Result<Box<dyn ChildProcess>> {
        let mut cmd = spec.to_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
        detach(&mut cmd);

        let child = cmd.spawn().map_err(|e| Self::spawn_error(spec, e))?;
        Ok(Box::new(SystemChild { child }))
    }
}

struct SystemChild {
    child: Child,
}

impl ChildProcess for SystemChild {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn try_wait(&mut self) -> Result<ChildState> {
        Ok(match self.child.try_wait()? {
            Some(status) => ChildState::Exited(status.code()),
            None => ChildState::Running,
        })
    }
}

/// Split a raw output line on carriage returns, dropping empty segments.
///
/// Progress bars redraw with `\r`; each redraw becomes its own segment.
pub fn progress_segments(line: &str) -> impl Iterator<Item = &str> {
    line.split('\r')
        .map(str::trim_end)
        .filter(|segment| !segment.is_empty())
}
