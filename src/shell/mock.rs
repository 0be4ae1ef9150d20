//! Mock process runner for testing.
//!
//! `MockRunner` implements [`ProcessRunner`] without starting anything. Rules
//! map a command to a scripted response; every invocation is recorded for
//! later assertion.
//!
//! # Example
//!
//! ```
//! use inkcut_launcher::shell::{CommandSpec, MockResponse, MockRunner, ProcessRunner};
//!
//! let runner = MockRunner::new();
//! runner.on(
//!     |spec| spec.has_arg("--version"),
//!     MockResponse::output(0, "Python 3.9.13\n"),
//! );
//!
//! let result = runner.output(&CommandSpec::new("python").arg("--version")).unwrap();
//! assert_eq!(result.stdout, "Python 3.9.13\n");
//! assert_eq!(runner.call_count(|spec| spec.has_arg("--version")), 1);
//! ```

use std::cell::RefCell;
use std::io;
use std::time::Duration;

use crate::error::{LauncherError, Result};

use super::command::{
    ChildProcess, ChildState, CommandResult, CommandSpec, OutputLine, ProcessRunner,
};

/// Scripted outcome of a mocked command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Ran to completion with this exit code and output.
    Output {
        code: i32,
        stdout: String,
        stderr: String,
    },
    /// Could not be started.
    SpawnError(io::ErrorKind),
    /// Detached child that is still alive when polled.
    Running,
}

impl MockResponse {
    pub fn output(code: i32, stdout: &str) -> Self {
        MockResponse::Output {
            code,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn success() -> Self {
        Self::output(0, "")
    }

    pub fn exit(code: i32) -> Self {
        Self::output(code, "")
    }
}

type Matcher = Box<dyn Fn(&CommandSpec) -> bool>;
type Responder = Box<dyn Fn(&CommandSpec) -> MockResponse>;

/// Mock process runner for testing.
///
/// When several rules match, the most recently added one wins. Commands
/// that match no rule exit with code 1 and no output.
#[derive(Default)]
pub struct MockRunner {
    rules: RefCell<Vec<(Matcher, Responder)>>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands matching `matcher` with a fixed response.
    pub fn on<M>(&self, matcher: M, response: MockResponse)
    where
        M: Fn(&CommandSpec) -> bool + 'static,
    {
        self.on_with(matcher, move |_| response.clone());
    }

    /// Answer commands matching `matcher` with a computed response.
    ///
    /// The responder may have side effects, such as creating the file an
    /// installer would have produced.
    pub fn on_with<M, R>(&self, matcher: M, responder: R)
    where
        M: Fn(&CommandSpec) -> bool + 'static,
        R: Fn(&CommandSpec) -> MockResponse + 'static,
    {
        self.rules
            .borrow_mut()
            .push((Box::new(matcher), Box::new(responder)));
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Number of recorded commands matching `pred`.
    pub fn call_count<P>(&self, pred: P) -> usize
    where
        P: Fn(&CommandSpec) -> bool,
    {
        self.calls.borrow().iter().filter(|spec| pred(spec)).count()
    }

    fn respond(&self, spec: &CommandSpec) -> MockResponse {
        self.calls.borrow_mut().push(spec.clone());
        let rules = self.rules.borrow();
        rules
            .iter()
            .rev()
            .find(|(matcher, _)| matcher(spec))
            .map(|(_, responder)| responder(spec))
            .unwrap_or_else(|| MockResponse::exit(1))
    }

    fn spawn_error(spec: &CommandSpec, kind: io::ErrorKind) -> LauncherError {
        LauncherError::CommandSpawn {
            command: spec.display(),
            source: io::Error::new(kind, "mocked spawn failure"),
        }
    }
}

impl ProcessRunner for MockRunner {
    fn output(&self, spec: &CommandSpec) -> Result<CommandResult> {
        match self.respond(spec) {
            MockResponse::Output {
                code,
                stdout,
                stderr,
            } => Ok(CommandResult::new(Some(code), stdout, stderr, Duration::ZERO)),
            MockResponse::SpawnError(kind) => Err(Self::spawn_error(spec, kind)),
            MockResponse::Running => Ok(CommandResult::new(
                None,
                String::new(),
                String::new(),
                Duration::ZERO,
            )),
        }
    }

    fn status(&self, spec: &CommandSpec) -> Result<Option<i32>> {
        match self.respond(spec) {
            MockResponse::Output { code, .. } => Ok(Some(code)),
            MockResponse::SpawnError(kind) => Err(Self::spawn_error(spec, kind)),
            MockResponse::Running => Ok(None),
        }
    }

    fn stream(
        &self,
        spec: &CommandSpec,
        on_line: &mut dyn FnMut(OutputLine),
    ) -> Result<CommandResult> {
        let result = self.output(spec)?;
        for line in result.stdout.lines() {
            on_line(OutputLine::Stdout(line.to_string()));
        }
        for line in result.stderr.lines() {
            on_line(OutputLine::Stderr(line.to_string()));
        }
        Ok(result)
    }

    fn spawn_detached(&self, spec: &CommandSpec) -> Result<Box<dyn ChildProcess>> {
        let state = match self.respond(spec) {
            MockResponse::Output { code, .. } => ChildState::Exited(Some(code)),
            MockResponse::SpawnError(kind) => return Err(Self::spawn_error(spec, kind)),
            MockResponse::Running => ChildState::Running,
        };
        Ok(Box::new(MockChild { state }))
    }
}

/// Detached child returned by [`MockRunner::spawn_detached`].
#[derive(Debug)]
pub struct MockChild {
    state: ChildState,
}

impl ChildProcess for MockChild {
    fn id(&self) -> u32 {
        4242
    }

    fn try_wait(&mut self) -> Result<ChildState> {
        Ok(self.state)
    }
}
