//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. Prompt answers are queued up front.
//!
//! # Example
//!
//! ```
//! use orgbuilder::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.queue_answers(["maybe", "y"]);
//!
//! ui.status("Creating scratch org");
//! assert_eq!(ui.prompt_line("Continue?").unwrap(), "maybe");
//! assert_eq!(ui.prompt_line("Continue?").unwrap(), "y");
//!
//! assert_eq!(ui.statuses(), ["Creating scratch org"]);
//! assert_eq!(ui.prompts_shown().len(), 2);
//! ```

use std::collections::VecDeque;

use crate::error::{BuilderError, Result};

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    statuses: Vec<String>,
    commands: Vec<String>,
    output: String,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    skips: Vec<String>,
    headers: Vec<String>,
    banners: Vec<(Vec<String>, bool)>,
    spinners: Vec<String>,
    answers: VecDeque<String>,
    prompts_shown: Vec<String>,
    screen_clears: usize,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Normal,
            ..Default::default()
        }
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Queue answers returned by `prompt_line`, in order.
    ///
    /// Once the queue is empty, `prompt_line` fails the way a closed stdin
    /// would.
    pub fn queue_answers<I, S>(&mut self, answers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers.extend(answers.into_iter().map(Into::into));
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Everything echoed through `output`, concatenated.
    pub fn output_text(&self) -> &str {
        &self.output
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn skips(&self) -> &[String] {
        &self.skips
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Banners shown, with their success flag.
    pub fn banners(&self) -> &[(Vec<String>, bool)] {
        &self.banners
    }

    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    pub fn screen_clears(&self) -> usize {
        self.screen_clears
    }

    /// Check if a specific message was shown anywhere.
    pub fn has_message(&self, msg: &str) -> bool {
        [
            &self.messages,
            &self.statuses,
            &self.successes,
            &self.warnings,
            &self.errors,
            &self.skips,
        ]
        .iter()
        .any(|list| list.iter().any(|m| m.contains(msg)))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn status(&mut self, msg: &str) {
        self.statuses.push(msg.to_string());
    }

    fn command(&mut self, msg: &str) {
        self.commands.push(msg.to_string());
    }

    fn output(&mut self, chunk: &str) {
        self.output.push_str(chunk);
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn skipped(&mut self, msg: &str) {
        self.skips.push(msg.to_string());
    }

    fn prompt_line(&mut self, question: &str) -> Result<String> {
        self.prompts_shown.push(question.to_string());
        self.answers.pop_front().ok_or_else(|| {
            BuilderError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no queued answer",
            ))
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner::new())
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_banner(&mut self, lines: &[&str], success: bool) {
        self.banners
            .push((lines.iter().map(|l| l.to_string()).collect(), success));
    }

    fn clear_screen(&mut self) {
        self.screen_clears += 1;
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Mock spinner that remembers being cleared.
#[derive(Debug, Default)]
pub struct MockSpinner {
    cleared: bool,
}

impl MockSpinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }
}

impl SpinnerHandle for MockSpinner {
    fn finish_and_clear(&mut self) {
        self.cleared = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_each_channel() {
        let mut ui = MockUI::new();
        ui.status("step");
        ui.command("sfdx force:org:open");
        ui.success("ok");
        ui.warning("careful");
        ui.error("bad");
        ui.skipped("LoadData");
        assert_eq!(ui.statuses(), ["step"]);
        assert_eq!(ui.commands(), ["sfdx force:org:open"]);
        assert!(ui.has_message("careful"));
        assert!(ui.has_message("LoadData"));
        assert_eq!(ui.errors(), ["bad"]);
    }

    #[test]
    fn prompt_without_answer_is_eof() {
        let mut ui = MockUI::new();
        let err = ui.prompt_line("Continue?").unwrap_err();
        assert!(err.to_string().contains("no queued answer"));
        assert_eq!(ui.prompts_shown(), ["Continue?"]);
    }

    #[test]
    fn output_is_concatenated() {
        let mut ui = MockUI::new();
        ui.output("hello ");
        ui.output("world");
        assert_eq!(ui.output_text(), "hello world");
    }

    #[test]
    fn banners_keep_success_flag() {
        let mut ui = MockUI::new();
        ui.show_banner(&["ABORTING"], false);
        assert_eq!(ui.banners()[0], (vec!["ABORTING".to_string()], false));
    }

    #[test]
    fn mock_spinner_records_clear() {
        let mut ui = MockUI::new();
        let mut spinner = ui.start_spinner("Pushing metadata");
        spinner.finish_and_clear();
        assert_eq!(ui.spinners(), ["Pushing metadata"]);

        let mut spinner = MockSpinner::new();
        assert!(!spinner.is_cleared());
        spinner.finish_and_clear();
        assert!(spinner.is_cleared());
    }
}
