//! List command implementation.
//!
//! The `orgbuilder list` command prints the step list in run order.

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::steps::{registry_for, HandlerRegistry, StepDescriptor};
use crate::ui::theme::BuilderTheme;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, ProjectLocation};

/// The list command implementation.
pub struct ListCommand {
    location: ProjectLocation,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(location: ProjectLocation, args: ListArgs) -> Self {
        Self { location, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

/// One line of the listing.
fn describe(index: usize, step: &StepDescriptor, registry: &HandlerRegistry) -> (String, bool) {
    let number = index + 1;
    match step.resolve(index) {
        Ok((name, data)) => {
            let payload = if data.is_some() { " (with data)" } else { "" };
            match registry.get(name) {
                Some(handler) => {
                    let label = handler.describe();
                    let label = if label.is_empty() {
                        String::new()
                    } else {
                        format!(" - {}", label)
                    };
                    (format!("{:02} {}{}{}", number, name, payload, label), true)
                }
                None => (format!("{:02} {}{} [not implemented]", number, name, payload), false),
            }
        }
        Err(e) => (format!("{:02} {} [malformed: {}]", number, step.display_name(), e), false),
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match self.location.load(ui) {
            Ok(config) => config,
            Err(result) => return Ok(result),
        };
        let registry = registry_for(&config);
        let theme = BuilderTheme::new();

        ui.message(&format!("  {}", theme.highlight.apply_to("Steps:")));
        if config.steps.is_empty() {
            ui.message(&format!("    {}", theme.dim.apply_to("(none)")));
        }
        for (index, step) in config.steps.iter().enumerate() {
            let (line, ok) = describe(index, step, &registry);
            if ok {
                ui.message(&format!("    {}", line));
            } else {
                ui.warning(&format!("    {}", line));
            }
        }

        if self.args.all {
            ui.message("");
            ui.message(&format!("  {}", theme.highlight.apply_to("Available:")));
            for name in registry.names() {
                let label = registry.get(name).map(|h| h.describe()).unwrap_or_default();
                ui.message(&format!("    {} {}", name, theme.dim.apply_to(label)));
            }
        }

        Ok(CommandResult::success())
    }
}
