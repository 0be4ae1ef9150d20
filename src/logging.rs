//! The launcher's log session.
//!
//! Lines look like `2026-01-31 14:02:11 [INFO] Launching Inkcut...` and are
//! appended to a file next to the executable and echoed to stdout.
//!
//! A [`LogSession`] installs its subscriber as the *thread default* rather
//! than the global default, so it can be closed before the launcher hands
//! off to a relaunched copy of itself, and tests can open independent
//! sessions side by side.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::error::Result;

/// Log file name, created next to the launcher executable.
pub const LOG_FILE_NAME: &str = "inkcut_launcher.log";

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "inkcut_launcher=info";

/// `timestamp [LEVEL] message` event format.
struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} [{}] ",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// The log file, shared between the subscriber and the session handle.
///
/// Once closed, writes are silently discarded.
#[derive(Clone, Default)]
struct SharedFile(Arc<Mutex<Option<File>>>);

impl SharedFile {
    fn close(&self) {
        if let Ok(mut slot) = self.0.lock() {
            if let Some(mut file) = slot.take() {
                let _ = file.flush();
            }
        }
    }
}

impl Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut slot) => match slot.as_mut() {
                Some(file) => file.write(buf),
                None => Ok(buf.len()),
            },
            Err(_) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0.lock() {
            Ok(mut slot) => slot.as_mut().map_or(Ok(()), |file| file.flush()),
            Err(_) => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = SharedFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// An open log: the file plus the thread-default subscriber writing to it.
pub struct LogSession {
    path: PathBuf,
    echo: bool,
    file: SharedFile,
    guard: Option<DefaultGuard>,
}

impl LogSession {
    /// Open `path` in append mode and log to it and to stdout.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, true)
    }

    /// Open `path` in append mode, echoing to stdout only when `echo` is set.
    pub fn open_with(path: &Path, echo: bool) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let shared = SharedFile(Arc::new(Mutex::new(Some(file))));

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_ansi(false)
            .with_writer(shared.clone());
        let stdout_layer = echo.then(|| {
            tracing_subscriber::fmt::layer()
                .event_format(LineFormat)
                .with_ansi(false)
                .with_writer(io::stdout)
        });

        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(stdout_layer)
            .with(filter);
        let guard = tracing::subscriber::set_default(subscriber);

        Ok(Self {
            path: path.to_path_buf(),
            echo,
            file: shared,
            guard: Some(guard),
        })
    }

    pub fn is_open(&self) -> bool {
        self.guard.is_some()
    }

    /// Open the same file again after [`close`](Self::close).
    ///
    /// Does nothing while the session is still open.
    pub fn reopen(&mut self) -> Result<()> {
        if !self.is_open() {
            *self = Self::open_with(&self.path, self.echo)?;
        }
        Ok(())
    }

    /// Flush and close the file and uninstall the subscriber.
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) {
        if let Some(guard) = self.guard.take() {
            drop(guard);
            self.file.close();
        }
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn writes_timestamped_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(LOG_FILE_NAME);

        let mut session = LogSession::open_with(&path, false).unwrap();
        tracing::info!("Launching {}...", "Inkcut");
        tracing::warn!("Download from {} failed: {}", "https://a.example", "HTTP 404");
        session.close();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let line = Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} \[(INFO|WARN)\] ").unwrap();
        assert!(line.is_match(lines[0]));
        assert!(lines[0].ends_with("[INFO] Launching Inkcut..."));
        assert!(lines[1].contains("[WARN] Download from https://a.example failed: HTTP 404"));
    }

    #[test]
    fn appends_to_existing_log() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(LOG_FILE_NAME);
        fs::write(&path, "previous run\n").unwrap();

        let mut session = LogSession::open_with(&path, false).unwrap();
        tracing::info!("second run");
        session.close();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous run\n"));
        assert!(content.contains("second run"));
    }

    #[test]
    fn nothing_written_after_close() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(LOG_FILE_NAME);

        let mut session = LogSession::open_with(&path, false).unwrap();
        tracing::info!("before");
        session.close();
        assert!(!session.is_open());
        tracing::info!("after");
        session.close();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("before"));
        assert!(!content.contains("after"));
    }

    #[test]
    fn reopen_appends_after_close() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(LOG_FILE_NAME);

        let mut session = LogSession::open_with(&path, false).unwrap();
        tracing::info!("before handoff");
        session.close();

        session.reopen().unwrap();
        assert!(session.is_open());
        tracing::error!("handoff failed");
        session.close();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[INFO] before handoff"));
        assert!(content.contains("[ERROR] handoff failed"));
    }

    #[test]
    fn reopen_while_open_keeps_session() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(LOG_FILE_NAME);

        let mut session = LogSession::open_with(&path, false).unwrap();
        session.reopen().unwrap();
        tracing::info!("once");
        session.close();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("once").count(), 1);
    }

    #[test]
    fn unwritable_location_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join(LOG_FILE_NAME);
        assert!(LogSession::open_with(&path, false).is_err());
    }
}
