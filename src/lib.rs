//! Inkcut launcher - bootstrap a pinned Python runtime and start Inkcut.
//!
//! The launcher makes sure the required Python version is installed,
//! installs it from the official mirrors when it is not, makes sure the
//! application's packages are importable, and finally starts the
//! application as `python -m <module>`.
//!
//! # Modules
//!
//! - [`config`] - Launcher settings with built-in defaults
//! - [`error`] - Error types and result aliases
//! - [`logging`] - The timestamped log file
//! - [`requirements`] - Import checks and pip installs
//! - [`runner`] - The launch sequence and self-relaunch
//! - [`runtime`] - Locating, downloading and installing the runtime
//! - [`shell`] - Process execution and host queries
//! - [`ui`] - Error, information and file-picker dialogs
//!
//! # Example
//!
//! ```
//! use inkcut_launcher::runtime::VersionTriple;
//!
//! let found = VersionTriple::parse_from_output("Python 3.9.13\n").unwrap();
//! assert_eq!(found, VersionTriple::new(3, 9, 13));
//! assert_eq!(found.major_minor(), "3.9");
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod requirements;
pub mod runner;
pub mod runtime;
pub mod shell;
pub mod ui;

pub use error::{LauncherError, Result};
