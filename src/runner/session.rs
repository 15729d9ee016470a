//! The handle steps use to run commands.
//!
//! A [`Session`] owns the [`RunContext`] of a run and borrows everything a
//! command needs: settings, the process executor, the artifact writer and
//! the UI. Every command goes through [`Session::run_single`] (directly or
//! via [`Session::run_array`]), which is what guarantees that each command
//! is announced, logged to an artifact, and that each failure is recorded
//! exactly once.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{FailurePolicy, Settings, TemplateVars};
use crate::error::{BuilderError, Result};
use crate::logs::{item_suffix, ArtifactWriter, CommandArtifact, COMMANDS_FILE, ERRORS_FILE};
use crate::runner::context::RunContext;
use crate::runner::executor::ProcessExecutor;
use crate::runner::gate::{ask_operator, GateDecision};
use crate::shell::{InvocationResult, Notification, ProcessError, ProcessEvent, ProcessRequest};
use crate::steps::StepOutcome;
use crate::ui::UserInterface;

/// One command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Full command line.
    pub line: String,
    /// Base name of the artifact.
    pub log_id: String,
    /// Resolve as soon as stdout contains this text.
    pub wait_for: Option<String>,
}

impl CommandSpec {
    pub fn new(line: impl Into<String>, log_id: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            log_id: log_id.into(),
            wait_for: None,
        }
    }

    pub fn wait_for(mut self, marker: impl Into<String>) -> Self {
        self.wait_for = Some(marker.into());
        self
    }
}

fn stamp(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Per-run execution handle.
pub struct Session<'a> {
    ctx: RunContext,
    settings: &'a Settings,
    project_root: PathBuf,
    vars: TemplateVars,
    executor: &'a dyn ProcessExecutor,
    writer: &'a dyn ArtifactWriter,
    ui: &'a mut dyn UserInterface,
}

impl<'a> Session<'a> {
    /// Start a session. The log root is resolved against `project_root`.
    pub fn new(
        settings: &'a Settings,
        project_root: impl Into<PathBuf>,
        executor: &'a dyn ProcessExecutor,
        writer: &'a dyn ArtifactWriter,
        ui: &'a mut dyn UserInterface,
    ) -> Self {
        let project_root = project_root.into();
        let log_root = project_root.join(&settings.log_root);
        Self {
            ctx: RunContext::new(log_root, settings.policy()),
            settings,
            project_root,
            vars: TemplateVars::new(),
            executor,
            writer,
            ui,
        }
    }

    /// Variables every command template can use.
    pub fn with_vars(mut self, vars: TemplateVars) -> Self {
        self.vars = vars;
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut RunContext {
        &mut self.ctx
    }

    pub fn into_context(self) -> RunContext {
        self.ctx
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn vars(&self) -> &TemplateVars {
        &self.vars
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn ui(&mut self) -> &mut dyn UserInterface {
        &mut *self.ui
    }

    /// Empty the log root so a run only leaves its own artifacts.
    pub fn prepare_logs(&mut self) -> Result<()> {
        self.writer
            .reset(&self.project_root, &self.settings.log_root)
    }

    /// Write `commands.txt` and `errors.txt` into the log root.
    pub fn write_summaries(&mut self) {
        let root = self.ctx.log_root().to_path_buf();
        let files = [
            (COMMANDS_FILE, self.ctx.commands_summary()),
            (ERRORS_FILE, self.ctx.errors_summary()),
        ];
        for (name, text) in files {
            let path = root.join(name);
            if let Err(e) = self.writer.write(&path, &text) {
                warn!("Could not write {}: {}", path.display(), e);
                self.ui
                    .warning(&format!("Could not write {}: {}", path.display(), e));
            }
        }
    }

    /// Record a failure against the current step and show it.
    pub fn report_error(&mut self, message: &str) {
        self.ctx.record_failure(message);
        self.ui.error(message);
    }

    /// Report a step that had nothing to do.
    pub fn skip(&mut self, label: &str, reason: &str) -> StepOutcome {
        self.ctx.set_current_step(label);
        self.ui.skipped(&format!("{} (Skipped: {})", label, reason));
        StepOutcome::skipped(reason)
    }

    /// Run one command for the step labelled `label`.
    ///
    /// On failure the error is recorded in the context before `Err` is
    /// returned; callers must not record it again.
    pub fn run_single(&mut self, label: &str, spec: &CommandSpec) -> Result<InvocationResult> {
        self.invoke(label, spec, None)
    }

    /// Run a command that opens a browser window.
    ///
    /// With browser opening disabled this succeeds without running anything.
    pub fn open_in_browser(&mut self, label: &str, spec: &CommandSpec) -> Result<StepOutcome> {
        if !self.settings.open_browser {
            self.ctx.set_current_step(label);
            self.ui.status(label);
            self.ui
                .message(&format!("Browser disabled, not running: {}", spec.line));
            return Ok(StepOutcome::Succeeded);
        }
        self.run_single(label, spec)?;
        Ok(StepOutcome::Succeeded)
    }

    /// Run one command per item, in order.
    ///
    /// Items are announced as `label (item)` and logged with letter
    /// suffixes. An empty list is a skip. Under the abort policy the first
    /// failure is returned at once; otherwise every item runs and the
    /// failures are returned together.
    pub fn run_array<F>(
        &mut self,
        label: &str,
        log_id: &str,
        items: &[String],
        mut command_for: F,
    ) -> Result<StepOutcome>
    where
        F: FnMut(&str) -> Result<String>,
    {
        if items.is_empty() {
            return Ok(self.skip(label, "no items"));
        }

        let mut failures = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let item_label = format!("{} ({})", label, item);
            let suffix = item_suffix(index);
            let attempt = match command_for(item) {
                Ok(line) => self
                    .invoke(&item_label, &CommandSpec::new(line, log_id), Some(&suffix))
                    .map(|_| ()),
                Err(e) => {
                    self.ctx.set_current_step(&item_label);
                    self.report_error(&e.to_string());
                    Err(e)
                }
            };

            if let Err(e) = attempt {
                if self.ctx.policy() == FailurePolicy::Abort {
                    self.ctx.set_current_step(label);
                    return Err(e);
                }
                failures.push(e.to_string());
            }
        }

        self.ctx.set_current_step(label);
        if failures.is_empty() {
            Ok(StepOutcome::Succeeded)
        } else {
            Err(BuilderError::StepFailed {
                step: label.to_string(),
                failures,
            })
        }
    }

    /// Pause at a confirmation gate.
    ///
    /// Unattended runs skip the gate and leave a notice. A "no" is recorded
    /// as a failure of the current step.
    pub fn confirm(&mut self, question: &str) -> Result<()> {
        let decision = if self.settings.operator_present {
            ask_operator(&mut *self.ui, question)?
        } else {
            GateDecision::Unattended
        };

        match decision {
            GateDecision::Approved => Ok(()),
            GateDecision::Unattended => {
                let notice = format!(
                    "{}: '{}' skipped due to unattended mode",
                    self.ctx.current_step(),
                    question
                );
                self.ui.warning(&notice);
                self.ctx.add_notice(notice);
                Ok(())
            }
            GateDecision::Rejected => {
                let step = self.ctx.current_step().to_string();
                self.report_error(&format!("Operator answered no to '{}'", question));
                Err(BuilderError::Rejected { step })
            }
        }
    }

    fn invoke(
        &mut self,
        label: &str,
        spec: &CommandSpec,
        suffix: Option<&str>,
    ) -> Result<InvocationResult> {
        self.ctx.set_current_step(label);
        self.ui.status(label);

        let mut request = match ProcessRequest::from_command_line(&spec.line, &self.project_root) {
            Ok(request) => request,
            Err(e) => {
                self.report_error(&e.to_string());
                return Err(BuilderError::CommandFailed {
                    step: label.to_string(),
                    command: spec.line.clone(),
                    code: None,
                });
            }
        };
        if self.settings.cooldown_secs > 0 {
            request.cooldown = Some(Duration::from_secs(self.settings.cooldown_secs));
        }

        let line = request.command_line();
        self.ctx.record_command(&line);
        self.ui.command(&line);
        self.ui
            .message(&format!("{} | {} | Started", stamp(&Local::now()), label));

        let echo = self.ui.output_mode().shows_command_output();
        let mut spinner = if echo {
            None
        } else {
            Some(self.ui.start_spinner(label))
        };

        let outcome = {
            let ui = &mut *self.ui;
            let wait_for = spec.wait_for.as_deref();
            let mut observer = |n: &Notification<'_>| {
                if echo {
                    if let ProcessEvent::Stdout(chunk) | ProcessEvent::Stderr(chunk) = n.event {
                        ui.output(chunk);
                    }
                }
                if let Some(marker) = wait_for {
                    if n.output.stdout.contains(marker) {
                        n.force_resolve();
                    }
                }
            };
            self.executor.execute(&request, &mut observer)
        };

        if let Some(spinner) = spinner.as_mut() {
            spinner.finish_and_clear();
        }

        match outcome {
            Ok(result) => {
                if result.forced {
                    debug!("{} resolved early on '{:?}'", label, spec.wait_for);
                }
                self.persist(label, suffix, &spec.log_id, &result, true);
                self.ui.success(&format!(
                    "{} | {} | Successfully completed",
                    stamp(&result.finished_at),
                    label
                ));
                Ok(result)
            }
            Err(err) => {
                self.persist(label, suffix, &spec.log_id, err.result(), false);
                self.fail_command(label, &err);
                Err(BuilderError::CommandFailed {
                    step: label.to_string(),
                    command: line,
                    code: err.result().exit_code,
                })
            }
        }
    }

    fn fail_command(&mut self, label: &str, err: &ProcessError) {
        let result = err.result();
        self.ctx.record_failure(err.to_string());
        self.ui.error(&format!(
            "{} | {} | Failed to execute",
            stamp(&result.finished_at),
            label
        ));
        if self.settings.verbose {
            for line in result.stderr.lines().chain(result.stdout.lines()) {
                let line = line.trim();
                if !line.is_empty() {
                    self.ui.error(line);
                }
            }
        }
    }

    fn persist(
        &mut self,
        label: &str,
        suffix: Option<&str>,
        log_id: &str,
        result: &InvocationResult,
        success: bool,
    ) {
        let path = self.ctx.artifact_path(suffix, log_id);
        let written = CommandArtifact::new(label, result, success)
            .render()
            .map_err(BuilderError::from)
            .and_then(|text| self.writer.write(&path, &text));
        if let Err(e) = written {
            warn!("Could not write {}: {}", path.display(), e);
            self.ui
                .warning(&format!("Could not write {}: {}", path.display(), e));
        }
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("ctx", &self.ctx)
            .field("project_root", &self.project_root)
            .finish_non_exhaustive()
    }
}
