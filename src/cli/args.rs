//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;

/// orgbuilder - Sequential sandbox provisioning.
#[derive(Debug, Parser)]
#[command(name = "orgbuilder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .orgbuilder/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Echo command output and report failing output line by line
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the configured steps (default if no command specified)
    Run(RunArgs),

    /// List the configured steps
    List(ListArgs),

    /// Validate configuration and step list without running anything
    Check(CheckArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// No operator is present; confirmation gates are skipped
    #[arg(long)]
    pub unattended: bool,

    /// Stop at the first failed step
    #[arg(long, conflicts_with = "continue_on_errors")]
    pub quit_on_errors: bool,

    /// Record failures and keep going
    #[arg(long)]
    pub continue_on_errors: bool,

    /// Never open browser windows
    #[arg(long)]
    pub no_browser: bool,
}

impl RunArgs {
    /// Apply the flags on top of the file settings.
    ///
    /// `unattended` is true when the flag, `ET_CICD` or a CI marker says so.
    pub fn apply(&self, settings: &mut Settings, unattended: bool) {
        if self.unattended || unattended {
            settings.operator_present = false;
        }
        if self.quit_on_errors {
            settings.quit_on_errors = true;
        }
        if self.continue_on_errors {
            settings.quit_on_errors = false;
        }
        if self.no_browser {
            settings.open_browser = false;
        }
    }
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Also show the registered step names
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Treat unknown steps as errors
    #[arg(long)]
    pub strict: bool,
}
