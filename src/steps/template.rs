//! Steps defined as command templates.
//!
//! Most steps differ only in the command lines they run and in whether
//! they run once or once per item. [`TemplateStep`] captures that as data;
//! both the built-in catalog and `custom_steps` from the config are built
//! from it.

use serde_json::Value;

use crate::config::{render_command, StepTemplateConfig, TemplateVars};
use crate::error::{BuilderError, Result};
use crate::runner::{CommandSpec, Session};
use crate::steps::handler::StepHandler;
use crate::steps::outcome::StepOutcome;

/// Once or per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandShape {
    /// Run every command once, in order.
    Once { commands: Vec<String> },
    /// Run `command` for each item, with `${item}` bound.
    PerItem { command: String, items: Vec<String> },
}

/// A step made of command templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateStep {
    pub label: String,
    pub log_id: String,
    pub shape: CommandShape,
    /// A disabled step is skipped.
    pub enabled: bool,
    /// The commands open a browser window. Only applies to `Once` steps.
    pub opens_browser: bool,
    /// Confirmation question asked after the commands succeeded.
    pub confirm: Option<String>,
    /// Resolve a command early once its stdout contains this marker.
    pub wait_for: Option<String>,
}

impl TemplateStep {
    pub fn once<I, S>(label: &str, log_id: &str, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            label,
            log_id,
            CommandShape::Once {
                commands: commands.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn per_item(label: &str, log_id: &str, command: &str, items: Vec<String>) -> Self {
        Self::new(
            label,
            log_id,
            CommandShape::PerItem {
                command: command.to_string(),
                items,
            },
        )
    }

    fn new(label: &str, log_id: &str, shape: CommandShape) -> Self {
        Self {
            label: label.to_string(),
            log_id: log_id.to_string(),
            shape,
            enabled: true,
            opens_browser: false,
            confirm: None,
            wait_for: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn opens_browser(mut self) -> Self {
        self.opens_browser = true;
        self
    }

    pub fn confirm(mut self, question: &str) -> Self {
        self.confirm = Some(question.to_string());
        self
    }

    /// Build from a `custom_steps` entry. The config is validated first, so
    /// a missing per-item `command` means the step runs `commands` once.
    pub fn from_config(name: &str, config: &StepTemplateConfig) -> Self {
        let log_id = config.log_id.as_deref().unwrap_or(name);
        let step = match &config.command {
            Some(command) => Self::per_item(&config.label, log_id, command, config.items.clone()),
            None => Self::once(&config.label, log_id, config.commands.clone()),
        };
        Self {
            enabled: config.enabled,
            opens_browser: config.opens_browser,
            confirm: config.confirm.clone(),
            wait_for: config.wait_for.clone(),
            ..step
        }
    }

    fn spec(&self, line: String, log_id: String) -> CommandSpec {
        let spec = CommandSpec::new(line, log_id);
        match &self.wait_for {
            Some(marker) => spec.wait_for(marker.clone()),
            None => spec,
        }
    }

    fn run_once(
        &self,
        session: &mut Session<'_>,
        commands: &[String],
        vars: &TemplateVars,
    ) -> Result<StepOutcome> {
        for (index, template) in commands.iter().enumerate() {
            session.context_mut().set_current_step(&self.label);
            let line = render_command(template, vars)
                .inspect_err(|e| session.report_error(&e.to_string()))?;
            let log_id = if commands.len() > 1 {
                format!("{}{}", self.log_id, index + 1)
            } else {
                self.log_id.clone()
            };
            let spec = self.spec(line, log_id);
            if self.opens_browser {
                session.open_in_browser(&self.label, &spec)?;
            } else {
                session.run_single(&self.label, &spec)?;
            }
        }
        Ok(StepOutcome::Succeeded)
    }

    fn payload_error(&self, session: &mut Session<'_>, message: String) -> BuilderError {
        session.context_mut().set_current_step(&self.label);
        session.report_error(&message);
        BuilderError::StepFailed {
            step: self.label.clone(),
            failures: vec![message],
        }
    }
}

/// Items carried by a descriptor payload: a list, or a single scalar.
pub fn payload_items(data: &Value) -> Option<Vec<String>> {
    match data {
        Value::Array(values) => values.iter().map(json_scalar).collect(),
        other => json_scalar(other).map(|item| vec![item]),
    }
}

/// Variables carried by a descriptor payload: a map of scalars.
pub fn payload_vars(data: &Value) -> Option<Vec<(String, String)>> {
    data.as_object()?
        .iter()
        .map(|(k, v)| json_scalar(v).map(|v| (k.clone(), v)))
        .collect()
}

fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl StepHandler for TemplateStep {
    fn run(&self, session: &mut Session<'_>, data: Option<&Value>) -> Result<StepOutcome> {
        if !self.enabled {
            return Ok(session.skip(&self.label, "disabled"));
        }

        let outcome = match &self.shape {
            CommandShape::Once { commands } => {
                let vars = match data {
                    None => session.vars().clone(),
                    Some(data) => match payload_vars(data) {
                        Some(extra) => session.vars().layered(extra),
                        None => {
                            return Err(self.payload_error(
                                session,
                                format!("expected a map of values, got {}", data),
                            ))
                        }
                    },
                };
                self.run_once(session, commands, &vars)?
            }
            CommandShape::PerItem { command, items } => {
                let items = match data {
                    None => items.clone(),
                    Some(data) => match payload_items(data) {
                        Some(items) => items,
                        None => {
                            return Err(self.payload_error(
                                session,
                                format!("expected a list of items, got {}", data),
                            ))
                        }
                    },
                };
                let vars = session.vars().clone();
                session.run_array(&self.label, &self.log_id, &items, |item| {
                    render_command(command, &vars.layered([("item", item)]))
                })?
            }
        };

        if outcome == StepOutcome::Succeeded {
            if let Some(question) = &self.confirm {
                session.context_mut().set_current_step(&self.label);
                session.confirm(question)?;
            }
        }
        Ok(outcome)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::logs::MemoryWriter;
    use crate::runner::ScriptedExecutor;
    use crate::ui::MockUI;
    use serde_json::json;

    fn vars() -> TemplateVars {
        let mut vars = TemplateVars::new();
        vars.set("cli", "sfdx");
        vars.set("alias", "scratch");
        vars
    }

    #[test]
    fn payload_list_and_scalar_become_items() {
        assert_eq!(payload_items(&json!(["a", 2])), Some(vec!["a".into(), "2".into()]));
        assert_eq!(payload_items(&json!("only")), Some(vec!["only".into()]));
        assert_eq!(payload_items(&json!({"a": 1})), None);
    }

    #[test]
    fn payload_map_becomes_vars() {
        assert_eq!(
            payload_vars(&json!({"alias": "other"})),
            Some(vec![("alias".into(), "other".into())])
        );
        assert_eq!(payload_vars(&json!(["x"])), None);
    }

    #[test]
    fn disabled_step_is_skipped() {
        let settings = Settings::default();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, "/p", &executor, &writer, &mut ui);
        let step = TemplateStep::once("Running Jest tests", "RunJest", ["npm test"]).enabled(false);
        let outcome = step.run(&mut session, None).unwrap();
        assert_eq!(outcome, StepOutcome::skipped("disabled"));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn once_renders_every_command_in_order() {
        let settings = Settings::default();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session =
            Session::new(&settings, "/p", &executor, &writer, &mut ui).with_vars(vars());
        session.context_mut().begin_step("CreateScratchOrg");
        let step = TemplateStep::once(
            "Creating scratch org",
            "CreateScratchOrg",
            [
                "${cli} force:org:create --setalias ${alias}",
                "${cli} force:config:set defaultusername=${alias}",
            ],
        );
        step.run(&mut session, None).unwrap();
        assert_eq!(
            executor.calls(),
            [
                "sfdx force:org:create --setalias scratch",
                "sfdx force:config:set defaultusername=scratch"
            ]
        );
        assert_eq!(
            writer.file_names(),
            vec!["01_CreateScratchOrg1.json", "01_CreateScratchOrg2.json"]
        );
    }

    #[test]
    fn payload_map_overrides_vars() {
        let settings = Settings::default();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session =
            Session::new(&settings, "/p", &executor, &writer, &mut ui).with_vars(vars());
        let step =
            TemplateStep::once("Reassign", "ReassignAlias", ["${cli} force:org:open -u ${alias}"]);
        step.run(&mut session, Some(&json!({"alias": "other"}))).unwrap();
        assert_eq!(executor.calls(), ["sfdx force:org:open -u other"]);
    }

    #[test]
    fn payload_list_replaces_items() {
        let settings = Settings::default();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session =
            Session::new(&settings, "/p", &executor, &writer, &mut ui).with_vars(vars());
        let step = TemplateStep::per_item(
            "Installing packages",
            "InstallPackages",
            "${cli} force:package:install --package ${item}",
            vec!["configured".into()],
        );
        step.run(&mut session, Some(&json!(["pkg1", "pkg2"]))).unwrap();
        assert_eq!(
            executor.calls(),
            [
                "sfdx force:package:install --package pkg1",
                "sfdx force:package:install --package pkg2"
            ]
        );
    }

    #[test]
    fn items_with_spaces_and_quotes_stay_one_argument() {
        let settings = Settings::default();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session =
            Session::new(&settings, "/p", &executor, &writer, &mut ui).with_vars(vars());
        let step = TemplateStep::per_item(
            "Publishing communities",
            "PublishCommunities",
            "${cli} force:community:publish --name ${item}",
            vec!["Partners \"EU\"".into(), "Bob's Site".into()],
        );

        let outcome = step.run(&mut session, None).unwrap();

        assert_eq!(outcome, StepOutcome::Succeeded);
        assert_eq!(
            executor.argv(),
            [
                ["sfdx", "force:community:publish", "--name", "Partners \"EU\""],
                ["sfdx", "force:community:publish", "--name", "Bob's Site"],
            ]
        );
        assert!(session.context().failures().is_empty());
        assert_eq!(session.context().commands(), executor.calls().as_slice());
    }

    #[test]
    fn wrong_payload_shape_is_a_recorded_failure() {
        let settings = Settings::default();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, "/p", &executor, &writer, &mut ui);
        let step = TemplateStep::per_item("Each", "Each", "echo ${item}", vec![]);
        let err = step.run(&mut session, Some(&json!({"a": 1}))).unwrap_err();
        assert!(matches!(err, BuilderError::StepFailed { .. }));
        assert_eq!(session.context().failures().len(), 1);
    }

    #[test]
    fn unknown_variable_fails_the_step_once() {
        let settings = Settings::default();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, "/p", &executor, &writer, &mut ui);
        let step = TemplateStep::once("Open", "Open", ["open ${nowhere}"]);
        let err = step.run(&mut session, None).unwrap_err();
        assert!(matches!(err, BuilderError::UnknownVariable { .. }));
        assert_eq!(session.context().failures().len(), 1);
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn confirmation_follows_the_commands() {
        let settings = Settings::default();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        ui.queue_answers(["y"]);
        let mut session =
            Session::new(&settings, "/p", &executor, &writer, &mut ui).with_vars(vars());
        let step = TemplateStep::once("Pausing", "PauseToCheck", ["${cli} force:org:open"])
            .opens_browser()
            .confirm("Ready?");
        assert_eq!(step.run(&mut session, None).unwrap(), StepOutcome::Succeeded);
        assert_eq!(executor.calls(), ["sfdx force:org:open"]);
        drop(session);
        assert_eq!(ui.prompts_shown(), ["Ready? [y/n]"]);
    }

    #[test]
    fn from_config_picks_shape() {
        let config = StepTemplateConfig {
            label: "Each".into(),
            command: Some("echo ${item}".into()),
            items: vec!["a".into()],
            ..StepTemplateConfig::default()
        };
        let step = TemplateStep::from_config("EachStep", &config);
        assert_eq!(step.log_id, "EachStep");
        assert_eq!(
            step.shape,
            CommandShape::PerItem {
                command: "echo ${item}".into(),
                items: vec!["a".into()]
            }
        );
    }
}
