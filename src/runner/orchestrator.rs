//! Sequential step orchestration.
//!
//! The orchestrator walks the step list once, strictly in order, and never
//! runs two steps at a time. How a failure is handled depends on the
//! failure policy: under `Continue` the run goes on, under `Abort` it stops
//! with [`BuilderError::Aborted`].

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::FailurePolicy;
use crate::error::{BuilderError, Result};
use crate::runner::context::FailureRecord;
use crate::runner::session::Session;
use crate::steps::{HandlerRegistry, StepDescriptor, StepOutcome, StepStatus};

/// What happened to one descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub number: u32,
    pub name: String,
    pub outcome: StepOutcome,
    #[serde(skip)]
    pub duration: Duration,
}

/// Summary of a run that went through the whole list.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub steps: Vec<StepRecord>,
    pub commands: Vec<String>,
    pub failures: Vec<FailureRecord>,
    pub notices: Vec<String>,
    #[serde(skip)]
    pub duration: Duration,
}

impl RunReport {
    /// No failure was recorded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// 0 for a clean run, 1 for a run that finished with errors.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }

    pub fn count(&self, status: StepStatus) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome.status() == status)
            .count()
    }
}

/// Runs step lists against a handler registry.
#[derive(Debug)]
pub struct Orchestrator {
    registry: HandlerRegistry,
}

impl Orchestrator {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Run `steps` in order.
    ///
    /// Returns the report when the end of the list is reached, whether or
    /// not failures were recorded. Returns `Err` when the run stopped early:
    /// a malformed descriptor, or a failure under the abort policy. The
    /// summary files are written in every case.
    pub fn run(&self, steps: &[StepDescriptor], session: &mut Session<'_>) -> Result<RunReport> {
        let started = Instant::now();
        session.prepare_logs()?;
        info!("Running {} step(s)", steps.len());

        let mut records = Vec::with_capacity(steps.len());
        for (index, descriptor) in steps.iter().enumerate() {
            let number = session
                .context_mut()
                .begin_step(descriptor.display_name());

            let (name, data) = match descriptor.resolve(index) {
                Ok(resolved) => resolved,
                Err(e) => {
                    session.report_error(&e.to_string());
                    session.write_summaries();
                    return Err(e);
                }
            };

            let Some(handler) = self.registry.get(name) else {
                // Not fatal even under the abort policy.
                let message = format!("not implemented: {}", name);
                warn!("{}", message);
                session.report_error(&message);
                records.push(StepRecord {
                    number,
                    name: name.to_string(),
                    outcome: StepOutcome::Failed {
                        errors: vec![message],
                    },
                    duration: Duration::ZERO,
                });
                continue;
            };

            debug!("Step {:02} {} starting", number, name);
            let step_started = Instant::now();
            let before = session.context().failures().len();

            let outcome = match handler.run(session, data) {
                Ok(outcome) => outcome,
                Err(e) if e.is_fatal() => {
                    if session.context().failures().len() == before {
                        session.report_error(&e.to_string());
                    }
                    session.write_summaries();
                    return Err(e);
                }
                Err(e) => {
                    warn!("Step '{}' errored: {}", name, e);
                    if session.context().failures().len() == before {
                        session.report_error(&e.to_string());
                    }
                    if session.context().policy() == FailurePolicy::Abort {
                        return Err(self.abort(session, e));
                    }
                    StepOutcome::Failed {
                        errors: session.context().failures()[before..]
                            .iter()
                            .map(|f| f.message.clone())
                            .collect(),
                    }
                }
            };

            debug!("Step {:02} {} {}", number, name, outcome.status());
            records.push(StepRecord {
                number,
                name: name.to_string(),
                outcome,
                duration: step_started.elapsed(),
            });
        }

        session.write_summaries();
        let ctx = session.context();
        Ok(RunReport {
            steps: records,
            commands: ctx.commands().to_vec(),
            failures: ctx.failures().to_vec(),
            notices: ctx.notices().to_vec(),
            duration: started.elapsed(),
        })
    }

    fn abort(&self, session: &mut Session<'_>, cause: BuilderError) -> BuilderError {
        let step = session.context().current_step().to_string();
        let last = format!("Last step: {}", step);
        session.ui().show_banner(
            &[
                "ABORTING",
                "Errors were found and quit_on_errors is set",
                last.as_str(),
            ],
            false,
        );
        session.write_summaries();
        BuilderError::Aborted {
            step,
            message: cause.to_string(),
        }
    }
}
