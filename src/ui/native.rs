//! Dialogs on a real host.
//!
//! On Windows these are a message box and the Windows Forms open-file
//! dialog (driven through PowerShell). Elsewhere messages go to stderr and
//! the file is asked for on the terminal, if there is one.

use std::path::PathBuf;

use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

use crate::shell::{CommandSpec, ProcessRunner, SystemRunner};

use super::UserInterface;

/// [`UserInterface`] for the host the launcher runs on.
#[derive(Debug, Default)]
pub struct NativeUI {
    runner: SystemRunner,
}

impl NativeUI {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Quote a string as a PowerShell single-quoted literal.
pub fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// PowerShell script showing an open-file dialog filtered to `expected_name`.
///
/// Prints the chosen path, or nothing when the dialog is canceled.
pub fn file_dialog_script(title: &str, expected_name: &str) -> String {
    let filter = format!("Python Installer|{expected_name}|Executables|*.exe");
    format!(
        "Add-Type -AssemblyName System.Windows.Forms; \
         $d = New-Object System.Windows.Forms.OpenFileDialog; \
         $d.Title = {}; $d.Filter = {}; $d.FileName = {}; \
         if ($d.ShowDialog() -eq [System.Windows.Forms.DialogResult]::OK) {{ Write-Output $d.FileName }}",
        ps_quote(title),
        ps_quote(&filter),
        ps_quote(expected_name)
    )
}

#[cfg(windows)]
fn message_box(title: &str, message: &str, icon: u32) {
    use std::ffi::OsStr;
    use std::iter::once;
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_OK};

    let wide = |s: &str| -> Vec<u16> { OsStr::new(s).encode_wide().chain(once(0)).collect() };
    let text = wide(message);
    let caption = wide(title);
    // SAFETY: both buffers are NUL-terminated and outlive the call
    let shown = unsafe { MessageBoxW(0, text.as_ptr(), caption.as_ptr(), MB_OK | icon) };
    if shown == 0 {
        tracing::error!("Unable to show message box.");
    }
}

impl UserInterface for NativeUI {
    #[cfg(windows)]
    fn error(&mut self, title: &str, message: &str) {
        message_box(
            title,
            message,
            windows_sys::Win32::UI::WindowsAndMessaging::MB_ICONERROR,
        );
    }

    #[cfg(not(windows))]
    fn error(&mut self, title: &str, message: &str) {
        let _ = Term::stderr().write_line(&format!(
            "{} {}",
            console::style(format!("{title}:")).red().bold(),
            message
        ));
    }

    #[cfg(windows)]
    fn info(&mut self, title: &str, message: &str) {
        message_box(
            title,
            message,
            windows_sys::Win32::UI::WindowsAndMessaging::MB_ICONINFORMATION,
        );
    }

    #[cfg(not(windows))]
    fn info(&mut self, title: &str, message: &str) {
        let _ = Term::stderr().write_line(&format!(
            "{} {}",
            console::style(format!("{title}:")).cyan().bold(),
            message
        ));
    }

    fn select_file(&mut self, title: &str, expected_name: &str) -> Option<PathBuf> {
        if cfg!(windows) {
            let spec = CommandSpec::new("powershell")
                .args(["-NoProfile", "-STA", "-Command"])
                .arg(file_dialog_script(title, expected_name));
            let result = match self.runner.output(&spec) {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("File selection dialog is unavailable: {}", e);
                    return None;
                }
            };
            let chosen = result.stdout.trim();
            return (!chosen.is_empty()).then(|| PathBuf::from(chosen));
        }

        let term = Term::stderr();
        if !term.is_term() {
            tracing::error!("No terminal attached for manual installer selection.");
            return None;
        }
        let answer: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{title}: path to {expected_name} (empty to cancel)"))
            .allow_empty(true)
            .interact_text_on(&term)
            .ok()?;
        let answer = answer.trim();
        (!answer.is_empty()).then(|| PathBuf::from(answer))
    }
}
