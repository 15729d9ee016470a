//! The built-in sandbox-provisioning catalog.
//!
//! Most steps are [`TemplateStep`] data over `settings.cli`. The few that
//! need to read a command's output, or touch files around a command, are
//! plain functions registered as closures.

use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::config::{render_command, BuilderConfig, SandboxTarget, TemplateVars};
use crate::error::{BuilderError, Result};
use crate::runner::{CommandSpec, Session};
use crate::steps::handler::HandlerRegistry;
use crate::steps::outcome::StepOutcome;
use crate::steps::template::TemplateStep;

/// Question asked after pages the operator has to act on.
const MANUAL_QUESTION: &str = "Have you completed the manual steps?";

/// Variables available to every command template of a run.
///
/// Values derived from `settings` and `org` come first; the free-form
/// `vars` table is layered on top and may shadow them.
pub fn template_vars(config: &BuilderConfig, project_root: &Path) -> TemplateVars {
    let org = &config.org;
    let mut vars = TemplateVars::new();
    vars.set("cli", config.settings.cli.as_str());
    vars.set("project_root", project_root.display().to_string());
    vars.set("log_root", config.settings.log_root.display().to_string());
    vars.set("alias", org.alias.as_str());
    vars.set("days", org.days.to_string());
    vars.set("scratch_def", org.scratch_def.as_str());
    vars.set("deploy_page", org.deploy_page.as_str());
    vars.set("etcopydata_folder", org.etcopydata_folder.as_str());
    if let Some(path) = &org.manual_metadata_before {
        vars.set("manual_metadata_before", path.as_str());
    }
    if let Some(path) = &org.manual_metadata_after {
        vars.set("manual_metadata_after", path.as_str());
    }
    if let Some(path) = &org.admin_profile {
        vars.set("admin_profile", path.as_str());
    }
    vars.layered(config.string_vars())
}

/// Registry with the catalog and the config's custom steps.
///
/// A custom step with the same name as a built-in replaces it.
pub fn registry_for(config: &BuilderConfig) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    register_builtin(&mut registry, config);
    for (name, step) in &config.custom_steps {
        registry.register(name.as_str(), TemplateStep::from_config(name, step));
    }
    registry
}

/// Register every built-in step.
pub fn register_builtin(registry: &mut HandlerRegistry, config: &BuilderConfig) {
    let org = config.org.clone();
    let apex = "${cli} force:apex:execute -f ${item} --json";

    registry.register(
        "RunJest",
        TemplateStep::once("Running Jest tests", "RunJest", ["npm run test:unit:CICD"])
            .enabled(org.run_jest_tests),
    );

    let enabled = org.import_data;
    registry.register_fn(
        "ValidateETCopyData",
        "Validating ETCopyData plugin",
        move |session, _| validate_etcopydata(session, enabled),
    );

    let enabled = org.backup_alias;
    registry.register_fn("BackupAlias", "Backing up alias", move |session, _| {
        backup_alias(session, enabled)
    });

    registry.register(
        "CreateScratchOrg",
        TemplateStep::once(
            "Creating scratch org",
            "CreateScratchOrg",
            [
                concat!(
                    "${cli} force:org:create -f ${scratch_def} --setdefaultusername",
                    " --setalias ${alias} -d ${days}"
                ),
                "${cli} force:config:set defaultusername=${alias}",
            ],
        )
        .enabled(org.create_scratch_org),
    );

    registry.register(
        "PauseToCheck",
        TemplateStep::once("Pausing to check the org", "PauseToCheck", ["${cli} force:org:open"])
            .opens_browser()
            .confirm("Is the org ready to continue?")
            .enabled(org.pause_to_check),
    );

    registry.register(
        "OpenDeployPage",
        TemplateStep::once(
            "Opening deploy page",
            "OpenDeployPage",
            ["${cli} force:org:open --path ${deploy_page}"],
        )
        .opens_browser()
        .enabled(org.show_deploy_page),
    );

    registry.register(
        "PrepareOrg",
        TemplateStep::per_item(
            "Preparing org",
            "PrepareOrg",
            "${cli} force:mdapi:deploy --deploydir ${item} --wait 30",
            org.prepare_org.clone(),
        ),
    );

    registry.register(
        "ManualMetadataBefore",
        TemplateStep::once(
            "Manual metadata (before push)",
            "ManualMetadataBefore",
            ["${cli} force:org:open --path ${manual_metadata_before}"],
        )
        .opens_browser()
        .confirm(MANUAL_QUESTION)
        .enabled(org.manual_metadata_before.is_some()),
    );

    registry.register(
        "ExecuteApexBeforePush",
        TemplateStep::per_item(
            "Executing Apex (before push)",
            "ExecuteApexBeforePush",
            apex,
            org.apex_before_push.clone(),
        ),
    );

    registry.register(
        "InstallPackages",
        TemplateStep::per_item(
            "Installing packages",
            "InstallPackages",
            "${cli} force:package:install --apexcompile=all --package ${item} --wait=30 --noprompt",
            org.packages.clone(),
        ),
    );

    registry.register(
        "PushMetadata",
        TemplateStep::once(
            "Pushing metadata",
            "PushMetadata",
            ["${cli} force:source:push --forceoverwrite --json"],
        ),
    );

    registry.register(
        "ManualMetadataAfter",
        TemplateStep::once(
            "Manual metadata (after push)",
            "ManualMetadataAfter",
            ["${cli} force:org:open --path ${manual_metadata_after}"],
        )
        .opens_browser()
        .confirm(MANUAL_QUESTION)
        .enabled(org.manual_metadata_after.is_some()),
    );

    registry.register(
        "ExecuteApexAfterPush",
        TemplateStep::per_item(
            "Executing Apex (after push)",
            "ExecuteApexAfterPush",
            apex,
            org.apex_after_push.clone(),
        ),
    );

    registry.register(
        "AssignPermissionSet",
        TemplateStep::per_item(
            "Assigning permission sets",
            "AssignPermissionSet",
            "${cli} force:user:permset:assign --permsetname ${item} --json",
            org.permission_sets.clone(),
        ),
    );

    let profile = org.admin_profile.clone();
    registry.register_fn(
        "DeployAdminProfile",
        "Deploying admin profile",
        move |session, _| deploy_admin_profile(session, profile.is_some()),
    );

    registry.register(
        "LoadData",
        TemplateStep::once(
            "Loading data",
            "LoadData",
            [concat!(
                "${cli} ETCopyData:import -c ${etcopydata_folder} --loglevel info --json",
                " --orgsource=${alias} --orgdestination=${alias}"
            )],
        )
        .enabled(org.import_data),
    );

    registry.register(
        "ExecuteApexAfterData",
        TemplateStep::per_item(
            "Executing Apex (after data)",
            "ExecuteApexAfterData",
            apex,
            org.apex_after_data.clone(),
        ),
    );

    registry.register(
        "RunApexTests",
        TemplateStep::once(
            "Running Apex tests",
            "RunApexTests",
            [concat!(
                "${cli} force:apex:test:run --codecoverage --verbose --json",
                " --resultformat=json --wait=60"
            )],
        )
        .enabled(org.run_apex_tests),
    );

    registry.register(
        "PushAgain",
        TemplateStep::once(
            "Pushing metadata again",
            "PushAgain",
            ["${cli} force:source:push -u ${alias} -f --json"],
        )
        .enabled(org.push_again),
    );

    registry.register(
        "ReassignAlias",
        TemplateStep::once(
            "Reassigning alias",
            "ReassignAlias",
            ["${cli} force:config:set defaultusername=${alias}"],
        )
        .enabled(org.reassign_alias),
    );

    registry.register(
        "PublishCommunity",
        TemplateStep::per_item(
            "Publishing communities",
            "PublishCommunity",
            "${cli} force:community:publish --name ${item}",
            org.publish_communities.clone(),
        ),
    );

    let enabled = org.generate_password;
    registry.register_fn(
        "GeneratePassword",
        "Generating password",
        move |session, _| generate_password(session, enabled),
    );

    let target = org.deploy_to_sandbox.clone();
    registry.register_fn(
        "DeployToSandbox",
        "Deploying to sandbox",
        move |session, data| deploy_to_sandbox(session, target.as_ref(), data),
    );

    registry.register_fn("QuitSuccess", "Final report", |session, _| {
        Ok(final_report(session))
    });
}

/// Render a template with the session's variables, recording a failure if
/// a variable is missing.
fn render_line(session: &mut Session<'_>, template: &str, vars: &TemplateVars) -> Result<String> {
    render_command(template, vars).inspect_err(|e| session.report_error(&e.to_string()))
}

/// Record `message` against `label` and turn it into the step's error.
fn step_failure(session: &mut Session<'_>, label: &str, message: String) -> BuilderError {
    session.context_mut().set_current_step(label);
    session.report_error(&message);
    BuilderError::StepFailed {
        step: label.to_string(),
        failures: vec![message],
    }
}

fn validate_etcopydata(session: &mut Session<'_>, enabled: bool) -> Result<StepOutcome> {
    let label = "Validating ETCopyData plugin";
    if !enabled {
        return Ok(session.skip(label, "disabled"));
    }
    let vars = session.vars().clone();
    let line = render_line(session, "${cli} plugins --core", &vars)?;
    let result = session.run_single(label, &CommandSpec::new(line, "ValidateETCopyData"))?;

    let matches = result
        .stdout
        .lines()
        .filter(|l| l.trim_start().to_lowercase().starts_with("etcopydata"))
        .count();
    if matches != 1 {
        return Err(step_failure(
            session,
            label,
            format!("ETCopyData plugin not found ({} matching plugin lines)", matches),
        ));
    }
    Ok(StepOutcome::Succeeded)
}

/// Find the value an alias points to in `alias:list --json` output.
pub fn find_alias(list_json: &str, alias: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(list_json.trim()).ok()?;
    parsed
        .get("result")?
        .as_array()?
        .iter()
        .find(|entry| entry.get("alias").and_then(Value::as_str) == Some(alias))?
        .get("value")?
        .as_str()
        .map(str::to_string)
}

fn backup_alias(session: &mut Session<'_>, enabled: bool) -> Result<StepOutcome> {
    let label = "Backing up alias";
    if !enabled {
        return Ok(session.skip(label, "disabled"));
    }
    let vars = session.vars().clone();
    let alias = vars.get("alias").unwrap_or_default().to_string();

    let line = render_line(session, "${cli} force:alias:list --json", &vars)?;
    let listed = session.run_single(label, &CommandSpec::new(line, "BackupAlias"))?;

    let Some(value) = find_alias(&listed.stdout, &alias) else {
        return Err(step_failure(
            session,
            label,
            format!("Alias '{}' not found", alias),
        ));
    };

    let vars = vars.layered([("alias_value", value)]);
    let line = render_line(session, "${cli} alias:set ${alias}.bak=${alias_value}", &vars)?;
    session.run_single(label, &CommandSpec::new(line, "BackupAlias"))?;
    Ok(StepOutcome::Succeeded)
}

fn deploy_admin_profile(session: &mut Session<'_>, enabled: bool) -> Result<StepOutcome> {
    let label = "Deploying admin profile";
    if !enabled {
        return Ok(session.skip(label, "no admin profile"));
    }
    session.context_mut().set_current_step(label);
    let vars = session.vars().clone();
    let line = render_line(session, "${cli} force:source:deploy -p ${admin_profile}", &vars)?;

    // The profile is usually listed in .forceignore; park the file in the
    // log root while deploying and put it back whatever happens.
    let ignore = session.project_root().join(".forceignore");
    let parked = session.context().log_root().join(".forceignore");
    let moved = if ignore.is_file() {
        fs::create_dir_all(session.context().log_root())?;
        fs::rename(&ignore, &parked)?;
        tracing::debug!("Moved {} to {}", ignore.display(), parked.display());
        true
    } else {
        false
    };

    let deployed = session.run_single(label, &CommandSpec::new(line, "DeployAdminProfile"));

    if moved {
        if let Err(e) = fs::rename(&parked, &ignore) {
            session.report_error(&format!("Could not restore .forceignore: {}", e));
        }
    }
    deployed?;
    Ok(StepOutcome::Succeeded)
}

/// The password in `user:display --json` output.
pub fn find_password(display_json: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(display_json.trim()).ok()?;
    parsed
        .get("result")?
        .get("password")?
        .as_str()
        .map(str::to_string)
}

fn generate_password(session: &mut Session<'_>, enabled: bool) -> Result<StepOutcome> {
    let label = "Generating password";
    if !enabled {
        return Ok(session.skip(label, "disabled"));
    }
    let vars = session.vars().clone();
    let line = render_line(session, "${cli} force:user:password:generate --json", &vars)?;
    session.run_single(label, &CommandSpec::new(line, "GeneratePassword"))?;

    let line = render_line(session, "${cli} force:user:display --json", &vars)?;
    let shown = session.run_single(label, &CommandSpec::new(line, "DisplayUser"))?;

    match find_password(&shown.stdout) {
        Some(password) => {
            session.ui().show_banner(&["Password", password.as_str()], true);
            Ok(StepOutcome::Succeeded)
        }
        None => Err(step_failure(
            session,
            label,
            "No password in user display output".to_string(),
        )),
    }
}

fn deploy_to_sandbox(
    session: &mut Session<'_>,
    configured: Option<&SandboxTarget>,
    data: Option<&Value>,
) -> Result<StepOutcome> {
    let label = "Deploying to sandbox";
    let target = match data {
        Some(data) => match serde_json::from_value::<SandboxTarget>(data.clone()) {
            Ok(target) => target,
            Err(e) => {
                return Err(step_failure(
                    session,
                    label,
                    format!("expected {{alias, folder}}: {}", e),
                ))
            }
        },
        None => match configured {
            Some(target) => target.clone(),
            None => return Ok(session.skip(label, "no sandbox configured")),
        },
    };

    let vars = session.vars().layered([
        ("sandbox_alias", target.alias.as_str()),
        ("sandbox_folder", target.folder.as_str()),
    ]);

    let line = render_line(
        session,
        "${cli} force:org:open --path ${deploy_page} --targetusername ${sandbox_alias}",
        &vars,
    )?;
    session.open_in_browser(
        "Opening deploy page in sandbox",
        &CommandSpec::new(line, "DeployToSandboxOpen"),
    )?;

    let line = render_line(
        session,
        concat!(
            "${cli} force:source:deploy --sourcepath=${sandbox_folder} --json --loglevel=trace",
            " --targetusername=${sandbox_alias}"
        ),
        &vars,
    )?;
    session.run_single(label, &CommandSpec::new(line, "DeployToSandbox"))?;

    let line = render_line(
        session,
        concat!(
            "${cli} force:apex:test:run --codecoverage --verbose --json --resultformat=json",
            " --wait=60 --targetusername=${sandbox_alias}"
        ),
        &vars,
    )?;
    session.run_single(
        "Running tests in sandbox",
        &CommandSpec::new(line, "DeployToSandboxTests"),
    )?;
    Ok(StepOutcome::Succeeded)
}

/// Enumerate what went wrong, or celebrate.
fn final_report(session: &mut Session<'_>) -> StepOutcome {
    session.context_mut().set_current_step("Final report");
    let failures = session.context().failures().to_vec();
    let notices = session.context().notices().to_vec();
    let ui = session.ui();

    for notice in &notices {
        ui.warning(notice);
    }
    if failures.is_empty() {
        ui.show_banner(&["SUCCESS", "All steps completed without errors"], true);
    } else {
        ui.error(&format!("{} error(s) recorded:", failures.len()));
        for failure in &failures {
            ui.error(&failure.to_string());
        }
        let count = format!("{} error(s)", failures.len());
        ui.show_banner(&["COMPLETED WITH ERRORS", count.as_str()], false);
    }
    StepOutcome::Succeeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::MemoryWriter;
    use crate::runner::ScriptedExecutor;
    use crate::ui::MockUI;
    use serde_json::json;
    use tempfile::TempDir;

    fn config(yaml: &str) -> BuilderConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn catalog_is_complete() {
        let registry = registry_for(&BuilderConfig::default());
        for name in [
            "RunJest",
            "ValidateETCopyData",
            "BackupAlias",
            "CreateScratchOrg",
            "PauseToCheck",
            "OpenDeployPage",
            "PrepareOrg",
            "ManualMetadataBefore",
            "ExecuteApexBeforePush",
            "InstallPackages",
            "PushMetadata",
            "ManualMetadataAfter",
            "ExecuteApexAfterPush",
            "AssignPermissionSet",
            "DeployAdminProfile",
            "LoadData",
            "ExecuteApexAfterData",
            "RunApexTests",
            "PushAgain",
            "ReassignAlias",
            "PublishCommunity",
            "GeneratePassword",
            "DeployToSandbox",
            "QuitSuccess",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert_eq!(registry.len(), 24);
    }

    #[test]
    fn custom_step_overrides_builtin() {
        let registry = registry_for(&config(
            "custom_steps:\n  RunJest:\n    label: Lint instead\n    commands: [npm run lint]\n",
        ));
        assert_eq!(registry.get("RunJest").unwrap().describe(), "Lint instead");
    }

    #[test]
    fn user_vars_shadow_builtin_vars() {
        let vars = template_vars(&config("vars:\n  cli: sf\n  extra: 1\n"), Path::new("/p"));
        assert_eq!(vars.get("cli"), Some("sf"));
        assert_eq!(vars.get("extra"), Some("1"));
        assert_eq!(vars.get("alias"), Some("scratch"));
    }

    #[test]
    fn finds_alias_in_list() {
        let out = concat!(
            r#"{"status":0,"result":[{"alias":"other","value":"a@b"},"#,
            r#"{"alias":"scratch","value":"test-x@example.com"}]}"#
        );
        assert_eq!(find_alias(out, "scratch").as_deref(), Some("test-x@example.com"));
        assert_eq!(find_alias(out, "missing"), None);
        assert_eq!(find_alias("not json", "scratch"), None);
    }

    #[test]
    fn finds_password() {
        assert_eq!(
            find_password(r#"{"result":{"password":"s3cret"}}"#).as_deref(),
            Some("s3cret")
        );
        assert_eq!(find_password(r#"{"result":{}}"#), None);
    }

    #[test]
    fn backup_alias_sets_bak_alias() {
        let cfg = config("org:\n  backup_alias: true\n");
        let settings = cfg.settings.clone();
        let executor = ScriptedExecutor::new().respond(
            "alias:list",
            0,
            r#"{"result":[{"alias":"scratch","value":"u@x.com"}]}"#,
        );
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, "/p", &executor, &writer, &mut ui)
            .with_vars(template_vars(&cfg, Path::new("/p")));
        session.context_mut().begin_step("BackupAlias");

        let registry = registry_for(&cfg);
        let outcome = registry.get("BackupAlias").unwrap().run(&mut session, None).unwrap();

        assert_eq!(outcome, StepOutcome::Succeeded);
        let calls = executor.calls();
        assert_eq!(calls[0], "sfdx force:alias:list --json");
        assert!(calls[1].starts_with("sfdx alias:set"));
        assert!(calls[1].contains("scratch.bak=u@x.com"));
        assert_eq!(
            writer.file_names(),
            vec!["01_BackupAlias-2.json", "01_BackupAlias.json"]
        );
    }

    #[test]
    fn backup_alias_missing_is_a_failure() {
        let cfg = config("org:\n  backup_alias: true\n");
        let settings = cfg.settings.clone();
        let executor = ScriptedExecutor::new().respond("alias:list", 0, r#"{"result":[]}"#);
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, "/p", &executor, &writer, &mut ui)
            .with_vars(template_vars(&cfg, Path::new("/p")));

        let registry = registry_for(&cfg);
        let err = registry.get("BackupAlias").unwrap().run(&mut session, None).unwrap_err();

        assert!(err.to_string().contains("Alias 'scratch' not found"));
        assert_eq!(session.context().failures().len(), 1);
        assert_eq!(executor.calls().len(), 1);
    }

    #[test]
    fn validate_etcopydata_needs_exactly_one_line() {
        let cfg = config("org:\n  import_data: true\n");
        let settings = cfg.settings.clone();
        let executor =
            ScriptedExecutor::new().respond("plugins", 0, "@salesforce/plugin-apex 1.0\n");
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, "/p", &executor, &writer, &mut ui)
            .with_vars(template_vars(&cfg, Path::new("/p")));

        let registry = registry_for(&cfg);
        assert!(registry
            .get("ValidateETCopyData")
            .unwrap()
            .run(&mut session, None)
            .is_err());
        assert_eq!(session.context().failures().len(), 1);
    }

    #[test]
    fn deploy_admin_profile_restores_forceignore_on_failure() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".forceignore"), "**/profiles\n").unwrap();
        let cfg = config("org:\n  admin_profile: force-app/profiles/Admin.profile-meta.xml\n");
        let settings = cfg.settings.clone();
        let executor = ScriptedExecutor::new().fail("source:deploy", "deploy failed");
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, temp.path(), &executor, &writer, &mut ui)
            .with_vars(template_vars(&cfg, temp.path()));

        let registry = registry_for(&cfg);
        assert!(registry
            .get("DeployAdminProfile")
            .unwrap()
            .run(&mut session, None)
            .is_err());

        assert_eq!(
            fs::read_to_string(temp.path().join(".forceignore")).unwrap(),
            "**/profiles\n"
        );
        assert!(!temp.path().join("etLogs/.forceignore").exists());
        assert_eq!(session.context().failures().len(), 1);
    }

    #[test]
    fn generate_password_announces_it() {
        let cfg = config("org:\n  generate_password: true\n");
        let settings = cfg.settings.clone();
        let executor = ScriptedExecutor::new()
            .respond("user:display", 0, r#"{"result":{"password":"s3cret"}}"#);
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, "/p", &executor, &writer, &mut ui)
            .with_vars(template_vars(&cfg, Path::new("/p")));

        let registry = registry_for(&cfg);
        registry
            .get("GeneratePassword")
            .unwrap()
            .run(&mut session, None)
            .unwrap();
        drop(session);
        assert_eq!(
            ui.banners()[0],
            (vec!["Password".to_string(), "s3cret".to_string()], true)
        );
    }

    #[test]
    fn deploy_to_sandbox_uses_payload_target() {
        let cfg = BuilderConfig::default();
        let settings = cfg.settings.clone();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, "/p", &executor, &writer, &mut ui)
            .with_vars(template_vars(&cfg, Path::new("/p")));

        let registry = registry_for(&cfg);
        registry
            .get("DeployToSandbox")
            .unwrap()
            .run(&mut session, Some(&json!({"alias": "uat", "folder": "deploy"})))
            .unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].contains("--targetusername uat"));
        assert!(calls[1].contains("--sourcepath=deploy"));
        assert!(calls[2].contains("--targetusername=uat"));
    }

    #[test]
    fn deploy_to_sandbox_without_target_is_skipped() {
        let cfg = BuilderConfig::default();
        let settings = cfg.settings.clone();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, "/p", &executor, &writer, &mut ui);

        let registry = registry_for(&cfg);
        let outcome = registry
            .get("DeployToSandbox")
            .unwrap()
            .run(&mut session, None)
            .unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped { .. }));
    }

    #[test]
    fn final_report_lists_failures() {
        let settings = crate::config::Settings::default();
        let executor = ScriptedExecutor::new();
        let writer = MemoryWriter::new();
        let mut ui = MockUI::new();
        let mut session = Session::new(&settings, "/p", &executor, &writer, &mut ui);
        session.context_mut().begin_step("Push");
        session.report_error("exit 1");

        assert_eq!(final_report(&mut session), StepOutcome::Succeeded);
        drop(session);
        assert!(ui.errors().contains(&"[Push] exit 1".to_string()));
        assert!(!ui.banners()[0].1);
    }
}
