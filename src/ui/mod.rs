//! User-facing dialogs.
//!
//! The launcher runs without a console on Windows, so the few things it
//! must tell or ask the user go through modal dialogs:
//! - [`UserInterface`] trait for the dialogs the launcher needs
//! - [`NativeUI`] for real hosts
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use inkcut_launcher::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.error("Inkcut Launcher", "Something went wrong");
//! assert_eq!(ui.errors().len(), 1);
//! ```

pub mod mock;
pub mod native;

pub use mock::MockUI;
pub use native::NativeUI;

use std::path::PathBuf;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Show a blocking error dialog.
    fn error(&mut self, title: &str, message: &str);

    /// Show a blocking informational dialog.
    fn info(&mut self, title: &str, message: &str);

    /// Let the user pick a file, suggesting `expected_name`.
    ///
    /// Returns `None` when the user cancels or no picker is available.
    fn select_file(&mut self, title: &str, expected_name: &str) -> Option<PathBuf>;
}

/// Title used for every launcher dialog.
pub fn dialog_title(app_name: &str) -> String {
    format!("{app_name} Launcher")
}
