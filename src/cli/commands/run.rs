//! Run command implementation.
//!
//! The `orgbuilder run` command executes the configured step list.

use tracing::debug;

use crate::cli::args::RunArgs;
use crate::config::validate;
use crate::error::Result;
use crate::logs::{ArtifactWriter, FsWriter};
use crate::runner::{Orchestrator, ProcessExecutor, Session, SystemExecutor};
use crate::shell::is_unattended;
use crate::steps::{registry_for, template_vars};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, ProjectLocation};

/// The run command implementation.
pub struct RunCommand {
    location: ProjectLocation,
    args: RunArgs,
    verbose: bool,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(location: ProjectLocation, args: RunArgs, verbose: bool) -> Self {
        Self {
            location,
            args,
            verbose,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Run against explicit collaborators.
    pub fn execute_with(
        &self,
        ui: &mut dyn UserInterface,
        executor: &dyn ProcessExecutor,
        writer: &dyn ArtifactWriter,
    ) -> Result<CommandResult> {
        let config = match self.location.load(ui) {
            Ok(config) => config,
            Err(result) => return Ok(result),
        };
        validate(&config)?;

        let mut settings = config.settings.clone();
        self.args.apply(&mut settings, is_unattended());
        if self.verbose {
            settings.verbose = true;
        }
        debug!("Effective settings: {:?}", settings);

        if ui.is_interactive() {
            ui.clear_screen();
        }
        ui.show_header(&format!("Building org '{}'", config.org.alias));
        if !settings.operator_present {
            ui.message("Unattended mode: confirmation gates will be skipped");
        }

        let root = &self.location.root;
        let orchestrator = Orchestrator::new(registry_for(&config));
        let mut session = Session::new(&settings, root.clone(), executor, writer, &mut *ui)
            .with_vars(template_vars(&config, root));

        let outcome = orchestrator.run(&config.steps, &mut session);
        drop(session);

        match outcome {
            Ok(report) => {
                debug!(
                    "Run finished in {:?} with {} failure(s)",
                    report.duration,
                    report.failures.len()
                );
                if report.is_clean() {
                    Ok(CommandResult::success())
                } else {
                    Ok(CommandResult::failure(report.exit_code()))
                }
            }
            Err(e) => {
                debug!("Run stopped: {}", e);
                Ok(CommandResult::failure(e.exit_code()))
            }
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        self.execute_with(ui, &SystemExecutor, &FsWriter)
    }
}
