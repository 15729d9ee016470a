//! Operator-facing output and prompts.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use orgbuilder::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("Org builder");
//! ui.success("Setup complete!");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::{parse_yes_no, prompt_line};
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, BuilderTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a plain message.
    fn message(&mut self, msg: &str);

    /// Announce the step (or item) about to run.
    fn status(&mut self, msg: &str);

    /// Show the command line about to run.
    fn command(&mut self, msg: &str);

    /// Echo a chunk of live process output.
    fn output(&mut self, chunk: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Display a skipped step.
    fn skipped(&mut self, msg: &str);

    /// Ask a question and return the raw line the operator typed.
    fn prompt_line(&mut self, question: &str) -> Result<String>;

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header line.
    fn show_header(&mut self, title: &str);

    /// Show a boxed banner, green when `success`, red otherwise.
    fn show_banner(&mut self, lines: &[&str], success: bool);

    /// Clear the screen before a run.
    fn clear_screen(&mut self) {}

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for a spinner shown while a command runs.
///
/// The command's outcome is reported as a normal line, so the spinner only
/// ever needs to go away.
pub trait SpinnerHandle {
    /// Remove the spinner without a final line.
    fn finish_and_clear(&mut self);
}
