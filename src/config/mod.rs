//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, layering and loading in [`loader`]
//! - Validation in [`validator`]
//! - `${var}` command templates in [`interpolation`]
//!
//! # Example
//!
//! ```
//! use orgbuilder::config::{load_merged_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".orgbuilder");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "steps: [RunJest, QuitSuccess]").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.steps.len(), 2);
//! ```

pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod validator;

pub use interpolation::{
    parse_template, render_command, template_variables, Segment, TemplateVars,
};
pub use loader::{
    deep_merge, load_config, load_config_file, load_merged_config, parse_config, ConfigPaths,
    CONFIG_DIR,
};
pub use schema::{
    scalar_to_string, BuilderConfig, FailurePolicy, OrgConfig, SandboxTarget, Settings,
    StepTemplateConfig,
};
pub use validator::{validate, validate_config, ValidationError};
