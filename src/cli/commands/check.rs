//! Check command implementation.
//!
//! The `orgbuilder check` command validates the configuration and the step
//! list without running anything.

use std::collections::BTreeSet;

use crate::cli::args::CheckArgs;
use crate::config::{template_variables, validate_config, BuilderConfig};
use crate::error::{Result, EXIT_CONFIG_ERROR};
use crate::steps::{registry_for, template_vars};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, ProjectLocation};

/// The check command implementation.
pub struct CheckCommand {
    location: ProjectLocation,
    args: CheckArgs,
}

/// Problems found by a check.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(location: ProjectLocation, args: CheckArgs) -> Self {
        Self { location, args }
    }

    /// Inspect `config` the way a run would see it.
    pub fn inspect(&self, config: &BuilderConfig) -> CheckReport {
        let mut report = CheckReport::default();
        report
            .errors
            .extend(validate_config(config).iter().map(ToString::to_string));

        let registry = registry_for(config);
        for (index, step) in config.steps.iter().enumerate() {
            match step.resolve(index) {
                Ok((name, _)) if !registry.contains(name) => {
                    let message = format!("steps[{}]: not implemented: {}", index, name);
                    if self.args.strict {
                        report.errors.push(message);
                    } else {
                        report.warnings.push(message);
                    }
                }
                Ok(_) => {}
                Err(e) => report.errors.push(format!("steps[{}]: {}", index, e)),
            }
        }

        // Payload maps can add variables at run time, so an unknown name is
        // only suspicious.
        let vars = template_vars(config, &self.location.root);
        for (name, step) in &config.custom_steps {
            let templates: Vec<&String> =
                step.commands.iter().chain(step.command.iter()).collect();
            // Values are shell-quoted when substituted; quoting them again
            // leaves literal quote characters in the argument.
            if templates
                .iter()
                .any(|t| t.contains("\"${") || t.contains("'${"))
            {
                report.warnings.push(format!(
                    "custom_steps.{}: variables are quoted automatically, \
                     drop the quotes around ${{...}}",
                    name
                ));
            }
            let used: BTreeSet<String> = templates
                .iter()
                .flat_map(|c| template_variables(c))
                .collect();
            for var in used {
                if var != "item" && vars.get(&var).is_none() {
                    report
                        .warnings
                        .push(format!("custom_steps.{}: unknown variable ${{{}}}", name, var));
                }
            }
        }
        report
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match self.location.load(ui) {
            Ok(config) => config,
            Err(result) => return Ok(result),
        };

        let report = self.inspect(&config);
        for warning in &report.warnings {
            ui.warning(warning);
        }
        for error in &report.errors {
            ui.error(error);
        }

        if report.errors.is_empty() {
            ui.success(&format!(
                "Configuration OK ({} step(s), {} warning(s))",
                config.steps.len(),
                report.warnings.len()
            ));
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(EXIT_CONFIG_ERROR))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn setup_project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".orgbuilder");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
        temp
    }

    fn check(temp: &TempDir, strict: bool) -> (CommandResult, MockUI) {
        let mut ui = MockUI::new();
        let result = CheckCommand::new(ProjectLocation::new(temp.path()), CheckArgs { strict })
            .execute(&mut ui)
            .unwrap();
        (result, ui)
    }

    #[test]
    fn valid_config_passes() {
        let temp = setup_project("steps: [RunJest, PushMetadata, QuitSuccess]\n");
        let (result, ui) = check(&temp, false);
        assert!(result.success);
        assert!(ui.successes()[0].starts_with("Configuration OK (3 step(s)"));
    }

    #[test]
    fn unknown_step_is_a_warning() {
        let temp = setup_project("steps: [Mystery]\n");
        let (result, ui) = check(&temp, false);
        assert!(result.success);
        assert_eq!(ui.warnings(), ["steps[0]: not implemented: Mystery"]);
    }

    #[test]
    fn strict_makes_unknown_steps_errors() {
        let temp = setup_project("steps: [Mystery]\n");
        let (result, _) = check(&temp, true);
        assert_eq!(result.exit_code, EXIT_CONFIG_ERROR);
    }

    #[test]
    fn malformed_step_is_an_error() {
        let temp = setup_project("steps:\n  - {}\n");
        let (result, ui) = check(&temp, false);
        assert_eq!(result.exit_code, EXIT_CONFIG_ERROR);
        assert!(ui.errors()[0].starts_with("steps[0]: Malformed step #0"));
    }

    #[test]
    fn quoted_template_variable_is_flagged() {
        let temp = setup_project(
            "custom_steps:\n  Open:\n    label: Open\n    \
             commands: ['sfdx force:org:open -u \"${alias}\"']\nsteps: [Open]\n",
        );
        let (result, ui) = check(&temp, false);
        assert!(result.success);
        assert!(ui.warnings().iter().any(|w| w.contains("quoted automatically")));
    }

    #[test]
    fn unknown_template_variable_is_flagged() {
        let temp = setup_project(
            "custom_steps:\n  Lint:\n    label: Lint\n    \
             commands: ['npm run ${script}']\nsteps: [Lint]\n",
        );
        let (result, ui) = check(&temp, false);
        assert!(result.success);
        assert_eq!(ui.warnings(), ["custom_steps.Lint: unknown variable ${script}"]);
    }
}
