//! Line prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

use crate::error::{BuilderError, Result};

/// Convert dialoguer errors to BuilderError.
fn map_dialoguer_err(e: dialoguer::Error) -> BuilderError {
    BuilderError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Read one line from the operator. Empty answers are allowed.
pub fn prompt_line(question: &str, term: &Term) -> Result<String> {
    Input::<String>::with_theme(&prompt_theme())
        .with_prompt(question)
        .allow_empty(true)
        .interact_text_on(term)
        .map_err(map_dialoguer_err)
}

/// Interpret an answer by its first character, case-insensitively.
///
/// Returns `None` for anything that is neither yes nor no.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim_start().chars().next()?.to_ascii_uppercase() {
        'Y' => Some(true),
        'N' => Some(false),
        _ => None,
    }
}
