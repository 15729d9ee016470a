//! Configuration schema definitions.
//!
//! These structs map one to one onto `.orgbuilder/config.yml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::steps::StepDescriptor;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Run-wide settings.
    pub settings: Settings,

    /// Free-form variables available to every command template.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, serde_yaml::Value>,

    /// Parameters of the built-in provisioning steps.
    pub org: OrgConfig,

    /// Additional steps defined as command templates.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_steps: BTreeMap<String, StepTemplateConfig>,

    /// Ordered step list; execution order.
    pub steps: Vec<StepDescriptor>,
}

impl BuilderConfig {
    /// Template variables declared under `vars`, rendered as strings.
    pub fn string_vars(&self) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
            .collect()
    }
}

/// Render a YAML scalar the way it would be typed on a command line.
pub fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// What happens when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and keep going.
    #[default]
    Continue,
    /// Stop the run at the first failure.
    Abort,
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Stop the whole run on the first failed step.
    pub quit_on_errors: bool,

    /// A human is watching and can answer confirmation gates.
    pub operator_present: bool,

    /// Browser-opening commands are allowed to run.
    pub open_browser: bool,

    /// Report failing output line by line.
    pub verbose: bool,

    /// Directory receiving log artifacts (relative to project root).
    pub log_root: PathBuf,

    /// Seconds to wait after a process closes before resolving.
    pub cooldown_secs: u64,

    /// Program used by the built-in step templates.
    pub cli: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quit_on_errors: false,
            operator_present: true,
            open_browser: true,
            verbose: false,
            log_root: PathBuf::from("etLogs"),
            cooldown_secs: 0,
            cli: "sfdx".to_string(),
        }
    }
}

impl Settings {
    /// The failure policy derived from `quit_on_errors`.
    pub fn policy(&self) -> FailurePolicy {
        if self.quit_on_errors {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        }
    }
}

/// Parameters for the built-in sandbox steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgConfig {
    pub alias: String,
    pub days: u32,
    pub scratch_def: String,
    pub deploy_page: String,
    pub run_jest_tests: bool,
    pub backup_alias: bool,
    pub create_scratch_org: bool,
    pub pause_to_check: bool,
    pub show_deploy_page: bool,
    pub prepare_org: Vec<String>,
    pub manual_metadata_before: Option<String>,
    pub apex_before_push: Vec<String>,
    pub packages: Vec<String>,
    pub manual_metadata_after: Option<String>,
    pub apex_after_push: Vec<String>,
    pub permission_sets: Vec<String>,
    pub admin_profile: Option<String>,
    pub import_data: bool,
    pub etcopydata_folder: String,
    pub apex_after_data: Vec<String>,
    pub run_apex_tests: bool,
    pub push_again: bool,
    pub reassign_alias: bool,
    pub publish_communities: Vec<String>,
    pub generate_password: bool,
    pub deploy_to_sandbox: Option<SandboxTarget>,
}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            alias: "scratch".to_string(),
            days: 7,
            scratch_def: "config/project-scratch-def.json".to_string(),
            deploy_page: "/lightning/setup/DeployStatus/home".to_string(),
            run_jest_tests: false,
            backup_alias: false,
            create_scratch_org: false,
            pause_to_check: false,
            show_deploy_page: false,
            prepare_org: Vec::new(),
            manual_metadata_before: None,
            apex_before_push: Vec::new(),
            packages: Vec::new(),
            manual_metadata_after: None,
            apex_after_push: Vec::new(),
            permission_sets: Vec::new(),
            admin_profile: None,
            import_data: false,
            etcopydata_folder: "./@ELTOROIT/data".to_string(),
            apex_after_data: Vec::new(),
            run_apex_tests: false,
            push_again: false,
            reassign_alias: false,
            publish_communities: Vec::new(),
            generate_password: false,
            deploy_to_sandbox: None,
        }
    }
}

/// A long-lived sandbox the metadata is also deployed to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SandboxTarget {
    pub alias: String,
    pub folder: String,
}

/// A step defined entirely by command templates.
///
/// Either `commands` (run once, in order) or `command` (run once per item
/// of `items`, with `${item}` bound) must be set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StepTemplateConfig {
    /// Human-readable label used in logs and reports.
    pub label: String,

    /// Base name of the log artifacts; defaults to the step name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,

    pub enabled: bool,

    /// The commands open a browser window.
    pub opens_browser: bool,

    /// Question asked at a confirmation gate after the commands ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<String>,

    /// Resolve a command as soon as its stdout contains this marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<String>,
}

impl Default for StepTemplateConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            log_id: None,
            commands: Vec::new(),
            command: None,
            items: Vec::new(),
            enabled: true,
            opens_browser: false,
            confirm: None,
            wait_for: None,
        }
    }
}
