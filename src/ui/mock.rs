//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. The file picker answer is
//! pre-configured.

use std::path::PathBuf;

use super::UserInterface;

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    errors: Vec<(String, String)>,
    infos: Vec<(String, String)>,
    file_requests: Vec<String>,
    selected_file: Option<PathBuf>,
}

impl MockUI {
    /// Create a MockUI whose file picker is always canceled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the file picker return `path`.
    pub fn with_selected_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.selected_file = Some(path.into());
        self
    }

    /// Captured error dialogs as `(title, message)`.
    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    /// Captured informational dialogs as `(title, message)`.
    pub fn infos(&self) -> &[(String, String)] {
        &self.infos
    }

    /// Expected file names the picker was opened for.
    pub fn file_requests(&self) -> &[String] {
        &self.file_requests
    }

    /// Whether any dialog at all was shown.
    pub fn was_shown(&self) -> bool {
        !self.errors.is_empty() || !self.infos.is_empty() || !self.file_requests.is_empty()
    }
}

impl UserInterface for MockUI {
    fn error(&mut self, title: &str, message: &str) {
        self.errors.push((title.to_string(), message.to_string()));
    }

    fn info(&mut self, title: &str, message: &str) {
        self.infos.push((title.to_string(), message.to_string()));
    }

    fn select_file(&mut self, _title: &str, expected_name: &str) -> Option<PathBuf> {
        self.file_requests.push(expected_name.to_string());
        self.selected_file.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_dialogs() {
        let mut ui = MockUI::new();
        ui.info("T", "hello");
        ui.error("T", "boom");
        assert_eq!(ui.infos(), &[("T".to_string(), "hello".to_string())]);
        assert_eq!(ui.errors()[0].1, "boom");
        assert!(ui.was_shown());
    }

    #[test]
    fn picker_canceled_by_default() {
        let mut ui = MockUI::new();
        assert_eq!(ui.select_file("T", "python.exe"), None);
        assert_eq!(ui.file_requests(), &["python.exe".to_string()]);
    }

    #[test]
    fn picker_returns_configured_file() {
        let mut ui = MockUI::new().with_selected_file("/downloads/python.exe");
        assert_eq!(
            ui.select_file("T", "python.exe"),
            Some(PathBuf::from("/downloads/python.exe"))
        );
    }

    #[test]
    fn fresh_mock_shows_nothing() {
        assert!(!MockUI::new().was_shown());
    }
}
