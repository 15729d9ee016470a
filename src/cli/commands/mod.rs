//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations and falls back to `run` when no
//! subcommand is given.

pub mod check;
pub mod dispatcher;
pub mod list;
pub mod run;

pub use check::{CheckCommand, CheckReport};
pub use dispatcher::{Command, CommandDispatcher, CommandResult, ProjectLocation};
pub use list::ListCommand;
pub use run::RunCommand;
