//! Per-command log artifacts.
//!
//! Every command the run issues leaves one JSON file in the log root named
//! `<step:02><letter?>_<logId>.json`, for example `07b_InstallPackages.json`
//! for the second package of step seven.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::shell::InvocationResult;

/// Letter suffix for the `index`-th item of an array step:
/// `a`..`z`, then `aa`, `ab`, ...
pub fn item_suffix(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// File name for an artifact.
pub fn artifact_name(step_number: u32, suffix: Option<&str>, log_id: &str) -> String {
    format!("{:02}{}_{}.json", step_number, suffix.unwrap_or(""), log_id)
}

/// What gets written for one command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandArtifact {
    pub step: String,
    pub command: String,
    pub cwd: PathBuf,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub success: bool,
    pub stdout: Value,
    pub stderr: Value,
}

impl CommandArtifact {
    pub fn new(step: &str, result: &InvocationResult, success: bool) -> Self {
        Self {
            step: step.to_string(),
            command: result.command.clone(),
            cwd: result.cwd.clone(),
            started_at: result.started_at,
            finished_at: result.finished_at,
            exit_code: result.exit_code,
            signal: result.signal,
            success,
            stdout: structured_output(&result.stdout),
            stderr: structured_output(&result.stderr),
        }
    }

    /// Pretty JSON with escaped line breaks and tabs turned back into the
    /// real characters, so captured tool output stays readable.
    pub fn render(&self) -> serde_json::Result<String> {
        let pretty = serde_json::to_string_pretty(self)?;
        Ok(pretty.replace("\\n", "\n").replace("\\t", "\t"))
    }
}

/// Captured output as JSON when the tool printed JSON, else as a string.
pub fn structured_output(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }
    Value::String(text.to_string())
}
