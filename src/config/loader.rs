//! Configuration file discovery and loading.
//!
//! The project file `.orgbuilder/config.yml` is required. A developer can
//! keep personal overrides (alias, operator flags) in
//! `.orgbuilder/config.local.yml`, which is merged on top of it.

use crate::config::schema::BuilderConfig;
use crate::error::{BuilderError, Result};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the configuration files.
pub const CONFIG_DIR: &str = ".orgbuilder";

/// Configuration files of a project, in merge order.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// `.orgbuilder/config.yml`
    pub project: Option<PathBuf>,

    /// `.orgbuilder/config.local.yml`
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        let dir = project_root.join(CONFIG_DIR);
        let existing = |name: &str| Some(dir.join(name)).filter(|p| p.is_file());
        Self {
            project: existing("config.yml"),
            project_local: existing("config.local.yml"),
        }
    }

    /// Where the project config is expected.
    pub fn expected_project(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_DIR).join("config.yml")
    }

    /// Existing files in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }
}

/// Merge `overlay` into `base`.
///
/// Mappings merge recursively, a null in the overlay removes the key, and
/// anything else (sequences included) is replaced wholesale. Replacing the
/// `steps` list rather than appending keeps the run order predictable.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    let (Value::Mapping(base_map), Value::Mapping(overlay_map)) = (base, overlay) else {
        return overlay.clone();
    };

    let mut merged = base_map.clone();
    for (key, value) in overlay_map {
        if value.is_null() {
            merged.remove(key);
            continue;
        }
        let next = match base_map.get(key) {
            Some(existing) => deep_merge(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    Value::Mapping(merged)
}

fn read_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BuilderError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => BuilderError::Io(e),
    })?;

    // An empty file is an empty mapping, not a null document.
    if content.trim().is_empty() {
        return Ok(Value::Mapping(Default::default()));
    }

    serde_yaml::from_str(&content).map_err(|e| BuilderError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse YAML content into a [`BuilderConfig`].
pub fn parse_config(content: &str, source_path: &Path) -> Result<BuilderConfig> {
    serde_yaml::from_str(content).map_err(|e| BuilderError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load one config file, without merging.
pub fn load_config_file(path: &Path) -> Result<BuilderConfig> {
    let value = read_value(path)?;
    from_value(value, path)
}

fn from_value(value: Value, path: &Path) -> Result<BuilderConfig> {
    serde_yaml::from_value(value).map_err(|e| BuilderError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the project config with its local overrides merged in.
pub fn load_merged_config(project_root: &Path) -> Result<BuilderConfig> {
    let paths = ConfigPaths::discover(project_root);
    if paths.project.is_none() {
        return Err(BuilderError::ConfigNotFound {
            path: ConfigPaths::expected_project(project_root),
        });
    }

    let mut merged = Value::Mapping(Default::default());
    for path in paths.all_existing() {
        tracing::debug!("Loading config layer {}", path.display());
        merged = deep_merge(&merged, &read_value(path)?);
    }
    from_value(merged, &ConfigPaths::expected_project(project_root))
}

/// Load config, honoring an explicit `--config` file.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<BuilderConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => load_merged_config(project_root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn project(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        temp
    }

    #[test]
    fn merge_overrides_scalars_and_keeps_siblings() {
        let base = yaml("settings:\n  quit_on_errors: false\n  cli: sfdx\n");
        let overlay = yaml("settings:\n  quit_on_errors: true\n");
        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged["settings"]["quit_on_errors"], Value::Bool(true));
        assert_eq!(merged["settings"]["cli"], yaml("sfdx"));
    }

    #[test]
    fn merge_replaces_sequences() {
        let base = yaml("steps: [A, B, C]");
        let overlay = yaml("steps: [C]");
        assert_eq!(deep_merge(&base, &overlay)["steps"], yaml("[C]"));
    }

    #[test]
    fn merge_null_removes_key() {
        let base = yaml("org:\n  alias: a\n  days: 3\n");
        let overlay = yaml("org:\n  days: ~\n");
        let merged = deep_merge(&base, &overlay);
        assert!(merged["org"].get("days").is_none());
        assert_eq!(merged["org"]["alias"], yaml("a"));
    }

    #[test]
    fn missing_project_config_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = load_merged_config(temp.path()).unwrap_err();
        assert!(matches!(err, BuilderError::ConfigNotFound { .. }));
    }

    #[test]
    fn local_overrides_are_merged() {
        let temp = project(&[
            ("config.yml", "org:\n  alias: shared\nsteps: [RunJest]\n"),
            ("config.local.yml", "org:\n  alias: mine\n"),
        ]);
        let config = load_merged_config(temp.path()).unwrap();
        assert_eq!(config.org.alias, "mine");
        assert_eq!(config.steps.len(), 1);
    }

    #[test]
    fn empty_project_file_loads_defaults() {
        let temp = project(&[("config.yml", "")]);
        let config = load_merged_config(temp.path()).unwrap();
        assert!(config.steps.is_empty());
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let temp = project(&[("config.yml", "settings: [unclosed")]);
        let err = load_merged_config(temp.path()).unwrap_err();
        assert!(matches!(err, BuilderError::ConfigParseError { .. }));
    }

    #[test]
    fn explicit_file_skips_discovery() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("other.yml");
        fs::write(&path, "settings:\n  quit_on_errors: true\n").unwrap();
        let config = load_config(temp.path(), Some(&path)).unwrap();
        assert!(config.settings.quit_on_errors);
    }
}
