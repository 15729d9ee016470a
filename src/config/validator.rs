//! Configuration validation.
//!
//! Runs before anything is executed so that template mistakes surface as
//! configuration errors instead of half-way through a run.

use crate::config::interpolation::template_variables;
use crate::config::schema::{BuilderConfig, StepTemplateConfig};
use crate::error::{BuilderError, Result};
use crate::logs::is_nested_folder;

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Where the problem is (`settings.log_root`, `custom_steps.Lint`, ...).
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Collect every problem in the configuration.
pub fn validate_config(config: &BuilderConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let log_root = &config.settings.log_root;
    if log_root.as_os_str().is_empty() {
        errors.push(ValidationError {
            path: "settings.log_root".into(),
            message: "must not be empty".into(),
        });
    } else if !is_nested_folder(log_root) {
        // The folder is wiped at the start of every run.
        errors.push(ValidationError {
            path: "settings.log_root".into(),
            message: format!(
                "'{}' must be a relative folder inside the project",
                log_root.display()
            ),
        });
    }
    if config.settings.cli.trim().is_empty() {
        errors.push(ValidationError {
            path: "settings.cli".into(),
            message: "must not be empty".into(),
        });
    }

    for (name, step) in &config.custom_steps {
        check_template(name, step, &mut errors);
    }

    errors
}

fn check_template(name: &str, step: &StepTemplateConfig, errors: &mut Vec<ValidationError>) {
    let path = format!("custom_steps.{}", name);
    let mut problem = |message: &str| {
        errors.push(ValidationError {
            path: path.clone(),
            message: message.to_string(),
        })
    };

    if step.label.trim().is_empty() {
        problem("label is required");
    }
    match (&step.command, step.commands.is_empty()) {
        (Some(_), false) => problem("set either 'command' (per item) or 'commands', not both"),
        (None, true) => problem("at least one command is required"),
        (Some(command), true) => {
            if !template_variables(command).contains("item") {
                problem("per-item 'command' must reference ${item}");
            }
        }
        (None, false) => {
            if step.commands.iter().any(|c| c.trim().is_empty()) {
                problem("commands must not be empty");
            }
            if !step.items.is_empty() {
                problem("'items' only applies to a per-item 'command'");
            }
        }
    }
}

/// Validate and turn the first problem into an error.
pub fn validate(config: &BuilderConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }
    Err(BuilderError::ConfigValidationError {
        message: errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    })
}
