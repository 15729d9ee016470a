//! Non-interactive UI for CI/headless environments.

use std::io::BufRead;

use crate::error::{BuilderError, Result};

use super::theme::BuilderTheme;
use super::{OutputMode, ProgressSpinner, SpinnerHandle, UserInterface};

/// UI implementation for non-interactive mode.
///
/// Prints plain lines to stdout and never draws spinners. Prompts read a
/// line from stdin so answers can be piped in; a closed stdin is an error.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: BuilderTheme,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: BuilderTheme::plain(),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_detail() {
            println!("{}", msg);
        }
    }

    fn status(&mut self, msg: &str) {
        println!("{}", self.theme.format_status(msg));
    }

    fn command(&mut self, msg: &str) {
        if self.mode.shows_detail() {
            println!("{}", self.theme.format_command(msg));
        }
    }

    fn output(&mut self, chunk: &str) {
        if self.mode.shows_command_output() {
            print!("{}", chunk);
        }
    }

    fn success(&mut self, msg: &str) {
        println!("{}", self.theme.format_success(msg));
    }

    fn warning(&mut self, msg: &str) {
        println!("{}", self.theme.format_warning(msg));
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn skipped(&mut self, msg: &str) {
        println!("{}", self.theme.format_skipped(msg));
    }

    fn prompt_line(&mut self, question: &str) -> Result<String> {
        println!("{}", question);
        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(BuilderError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("no answer on stdin for: {}", question),
            )));
        }
        Ok(line.trim_end().to_string())
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(ProgressSpinner::hidden())
    }

    fn show_header(&mut self, title: &str) {
        println!("\n{}\n", title);
    }

    fn show_banner(&mut self, lines: &[&str], success: bool) {
        println!("{}", self.theme.format_banner(lines, success));
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
