//! Mutable bookkeeping for one run.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::FailurePolicy;
use crate::logs::artifact_name;

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    /// Counter of the step that was running.
    pub step_number: u32,
    /// Label of the step (or item) that was running.
    pub step: String,
    pub message: String,
}

impl std::fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.step, self.message)
    }
}

/// Counters, audit trail and failures accumulated while a run progresses.
///
/// The step counter only grows. The failure list only grows, and in the
/// order failures happened.
#[derive(Debug, Clone)]
pub struct RunContext {
    step_number: u32,
    current_step: String,
    commands: Vec<String>,
    failures: Vec<FailureRecord>,
    notices: Vec<String>,
    log_root: PathBuf,
    policy: FailurePolicy,
    artifact_names: HashSet<String>,
}

impl RunContext {
    pub fn new(log_root: impl Into<PathBuf>, policy: FailurePolicy) -> Self {
        Self {
            step_number: 0,
            current_step: String::new(),
            commands: Vec::new(),
            failures: Vec::new(),
            notices: Vec::new(),
            log_root: log_root.into(),
            policy,
            artifact_names: HashSet::new(),
        }
    }

    /// Advance the counter for the next descriptor and return its number.
    pub fn begin_step(&mut self, label: impl Into<String>) -> u32 {
        self.step_number += 1;
        self.current_step = label.into();
        self.step_number
    }

    pub fn step_number(&self) -> u32 {
        self.step_number
    }

    pub fn current_step(&self) -> &str {
        &self.current_step
    }

    pub fn set_current_step(&mut self, label: impl Into<String>) {
        self.current_step = label.into();
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn log_root(&self) -> &Path {
        &self.log_root
    }

    pub fn record_command(&mut self, line: impl Into<String>) {
        self.commands.push(line.into());
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Record a failure against the current step.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        let record = FailureRecord {
            step_number: self.step_number,
            step: self.current_step.clone(),
            message: message.into(),
        };
        tracing::debug!("Recorded failure {}", record);
        self.failures.push(record);
    }

    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    pub fn add_notice(&mut self, notice: impl Into<String>) {
        self.notices.push(notice.into());
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Path for the next artifact of the current step.
    ///
    /// Names never repeat within a run: a clash (two commands of one step
    /// sharing a log id) gets a `-2`, `-3`, ... suffix.
    pub fn artifact_path(&mut self, suffix: Option<&str>, log_id: &str) -> PathBuf {
        let base = artifact_name(self.step_number, suffix, log_id);
        let mut name = base.clone();
        let mut n = 1;
        while !self.artifact_names.insert(name.clone()) {
            n += 1;
            let stem = base.trim_end_matches(".json");
            name = format!("{}-{}.json", stem, n);
        }
        self.log_root.join(name)
    }

    /// Text of `commands.txt`.
    pub fn commands_summary(&self) -> String {
        let mut out = self.commands.join("\n");
        out.push('\n');
        out
    }

    /// Text of `errors.txt`.
    pub fn errors_summary(&self) -> String {
        if self.failures.is_empty() {
            return "No errors\n".to_string();
        }
        let mut out = String::new();
        for failure in &self.failures {
            out.push_str(&failure.to_string());
            out.push('\n');
        }
        out
    }
}
