//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::error::Result;

use super::{
    prompt_line, should_use_colors, BuilderTheme, NonInteractiveUI, OutputMode, ProgressSpinner,
    SpinnerHandle, UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: BuilderTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            BuilderTheme::new()
        } else {
            BuilderTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }

    fn line(&mut self, text: String) {
        writeln!(self.term, "{}", text).ok();
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_detail() {
            self.line(msg.to_string());
        }
    }

    fn status(&mut self, msg: &str) {
        let text = self.theme.format_status(msg);
        self.line(text);
    }

    fn command(&mut self, msg: &str) {
        if self.mode.shows_detail() {
            let text = self.theme.format_command(msg);
            self.line(text);
        }
    }

    fn output(&mut self, chunk: &str) {
        if self.mode.shows_command_output() {
            write!(self.term, "{}", self.theme.dim.apply_to(chunk)).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        let text = self.theme.format_success(msg);
        self.line(text);
    }

    fn warning(&mut self, msg: &str) {
        let text = self.theme.format_warning(msg);
        self.line(text);
    }

    fn error(&mut self, msg: &str) {
        let text = self.theme.format_error(msg);
        self.line(text);
    }

    fn skipped(&mut self, msg: &str) {
        let text = self.theme.format_skipped(msg);
        self.line(text);
    }

    fn prompt_line(&mut self, question: &str) -> Result<String> {
        prompt_line(question, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn show_header(&mut self, title: &str) {
        let text = self.theme.format_header(title);
        self.line(format!("\n{}\n", text));
    }

    fn show_banner(&mut self, lines: &[&str], success: bool) {
        let text = self.theme.format_banner(lines, success);
        self.line(text);
    }

    fn clear_screen(&mut self) {
        if self.mode.shows_detail() {
            self.term.clear_screen().ok();
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Create the appropriate UI based on interactivity.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}
