//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::config::{load_config, BuilderConfig};
use crate::error::{BuilderError, Result, EXIT_CONFIG_ERROR};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Where a command finds its project and configuration.
#[derive(Debug, Clone)]
pub struct ProjectLocation {
    pub root: PathBuf,
    /// Explicit `--config` file.
    pub config: Option<PathBuf>,
}

impl ProjectLocation {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: None,
        }
    }

    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration, telling the operator where it was expected
    /// when there is none.
    pub fn load(
        &self,
        ui: &mut dyn UserInterface,
    ) -> std::result::Result<BuilderConfig, CommandResult> {
        match load_config(&self.root, self.config.as_deref()) {
            Ok(config) => Ok(config),
            Err(BuilderError::ConfigNotFound { path }) => {
                ui.error(&format!("No configuration found at {}", path.display()));
                Err(CommandResult::failure(EXIT_CONFIG_ERROR))
            }
            Err(e) => {
                ui.error(&e.to_string());
                Err(CommandResult::failure(e.exit_code()))
            }
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    location: ProjectLocation,
    verbose: bool,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project.
    pub fn new(location: ProjectLocation, verbose: bool) -> Self {
        Self { location, verbose }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.location.root
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Run(args)) => {
                super::run::RunCommand::new(self.location.clone(), args.clone(), self.verbose)
                    .execute(ui)
            }
            Some(Commands::List(args)) => {
                super::list::ListCommand::new(self.location.clone(), args.clone()).execute(ui)
            }
            Some(Commands::Check(args)) => {
                super::check::CheckCommand::new(self.location.clone(), args.clone()).execute(ui)
            }
            None => {
                super::run::RunCommand::new(self.location.clone(), RunArgs::default(), self.verbose)
                    .execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(ProjectLocation::new("/test"), false);
        assert_eq!(dispatcher.project_root(), Path::new("/test"));
    }

    #[test]
    fn missing_config_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let result = ProjectLocation::new(temp.path()).load(&mut ui).unwrap_err();
        assert_eq!(result.exit_code, EXIT_CONFIG_ERROR);
        assert!(ui.errors()[0].starts_with("No configuration found at"));
    }
}
