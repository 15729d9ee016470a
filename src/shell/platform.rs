//! Platform and environment detection.

use crate::error::{BuilderError, Result};

/// Variables whose presence marks a CI runner.
const CI_MARKERS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Variable set by pipelines that drive the builder unattended.
pub const UNATTENDED_VAR: &str = "ET_CICD";

/// Check if no operator can answer prompts (`ET_CICD` or any CI marker).
pub fn is_unattended() -> bool {
    unattended_from(|name| std::env::var(name).ok())
}

fn ci_marker_set(lookup: impl Fn(&str) -> Option<String>) -> bool {
    CI_MARKERS.iter().any(|name| lookup(name).is_some())
}

fn unattended_from(lookup: impl Fn(&str) -> Option<String>) -> bool {
    let flagged = lookup(UNATTENDED_VAR)
        .map(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false);
    flagged || ci_marker_set(lookup)
}

/// Split a command line into program and arguments, honoring quotes.
///
/// Templates are written the way an operator would type them
/// (`--setalias "my org"`), so splitting on spaces is not enough.
pub fn split_command(line: &str) -> Result<(String, Vec<String>)> {
    let mut words = shell_words::split(line).map_err(|e| BuilderError::ConfigValidationError {
        message: format!("cannot parse command '{}': {}", line, e),
    })?;
    if words.is_empty() {
        return Err(BuilderError::ConfigValidationError {
            message: "command is empty".to_string(),
        });
    }
    let program = words.remove(0);
    Ok((program, words))
}

/// Render program and arguments back into a single copy-pasteable line.
pub fn join_command(program: &str, args: &[String]) -> String {
    let mut words = Vec::with_capacity(args.len() + 1);
    words.push(program);
    words.extend(args.iter().map(String::as_str));
    shell_words::join(words)
}
