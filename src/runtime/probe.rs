//! Interpreter version probing.

use std::path::Path;

use crate::runtime::VersionTriple;
use crate::shell::{CommandSpec, ProcessRunner};

/// Asks an interpreter executable for its version.
pub struct VersionProbe<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> VersionProbe<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Run `<exe> --version` and parse the reported version.
    ///
    /// Spawn failures and non-zero exits are logged and yield `None`, as does
    /// output without a version triple.
    pub fn probe(&self, exe: &Path) -> Option<VersionTriple> {
        let spec = CommandSpec::new(exe).arg("--version");
        let result = match self.runner.output(&spec) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Failed to query {}: {}", exe.display(), e);
                return None;
            }
        };

        if !result.success {
            tracing::warn!(
                "Failed to query {}: exited with code {}",
                exe.display(),
                result
                    .exit_code
                    .map_or_else(|| "unknown".to_string(), |c| c.to_string())
            );
            return None;
        }

        let version = VersionTriple::parse_from_output(result.combined().trim());
        tracing::debug!("{} reports version {:?}", exe.display(), version);
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{MockResponse, MockRunner};
    use std::io;

    #[test]
    fn parses_version_from_stdout() {
        let runner = MockRunner::new();
        runner.on(|_| true, MockResponse::output(0, "Python 3.9.13\n"));
        let probe = VersionProbe::new(&runner);
        assert_eq!(
            probe.probe(Path::new("python")),
            Some(VersionTriple::new(3, 9, 13))
        );
        assert_eq!(runner.call_count(|spec| spec.has_arg("--version")), 1);
    }

    #[test]
    fn parses_version_from_stderr() {
        let runner = MockRunner::new();
        runner.on(
            |_| true,
            MockResponse::Output {
                code: 0,
                stdout: String::new(),
                stderr: "Python 2.7.18\n".to_string(),
            },
        );
        let probe = VersionProbe::new(&runner);
        assert_eq!(
            probe.probe(Path::new("python")),
            Some(VersionTriple::new(2, 7, 18))
        );
    }

    #[test]
    fn nonzero_exit_yields_none() {
        let runner = MockRunner::new();
        runner.on(|_| true, MockResponse::output(1, "Python 3.9.13\n"));
        assert_eq!(VersionProbe::new(&runner).probe(Path::new("python")), None);
    }

    #[test]
    fn spawn_failure_yields_none() {
        let runner = MockRunner::new();
        runner.on(|_| true, MockResponse::SpawnError(io::ErrorKind::NotFound));
        assert_eq!(VersionProbe::new(&runner).probe(Path::new("python")), None);
    }

    #[test]
    fn unparseable_output_yields_none() {
        let runner = MockRunner::new();
        runner.on(|_| true, MockResponse::output(0, "garbage"));
        assert_eq!(VersionProbe::new(&runner).probe(Path::new("python")), None);
    }
}
