//! orgbuilder - Sequential sandbox provisioning.
//!
//! orgbuilder drives an external CLI through an ordered, declarative list of
//! steps. Every command is announced, logged to a JSON artifact and
//! classified; failures are collected or abort the run depending on policy.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types, result alias and exit codes
//! - [`logs`] - Log artifacts and the writers that persist them
//! - [`runner`] - Run context, sessions and the step orchestrator
//! - [`shell`] - Child process execution
//! - [`steps`] - Step descriptors, handlers and the built-in catalog
//! - [`ui`] - Terminal output, spinners and prompts
//!
//! # Example
//!
//! ```
//! use orgbuilder::config::{render_command, TemplateVars};
//!
//! let mut vars = TemplateVars::new();
//! vars.set("cli", "sfdx");
//! vars.set("alias", "dev");
//! let command = render_command("${cli} force:org:open -u ${alias}", &vars).unwrap();
//! assert_eq!(command, "sfdx force:org:open -u dev");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logs;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{BuilderError, Result};
