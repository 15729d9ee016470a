//! orgbuilder CLI entry point.

use orgbuilder::cli::{Cli, CommandDispatcher, Commands, ProjectLocation};
use orgbuilder::shell::is_unattended;
use orgbuilder::ui::{create_ui, OutputMode};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("orgbuilder=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orgbuilder=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("orgbuilder starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    };

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let project_root = match cli.project.clone() {
        Some(root) => root,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Error: cannot determine current directory: {}", e);
                std::process::exit(1);
            }
        },
    };

    // Prompts need a real terminal; piped runs read answers from stdin.
    let is_interactive = console::Term::stdout().is_term()
        && match &cli.command {
            Some(Commands::Run(args)) => !args.unattended && !is_unattended(),
            None => !is_unattended(),
            _ => false,
        };

    let mut ui = create_ui(is_interactive, output_mode);

    let location = ProjectLocation::new(project_root).with_config(cli.config.clone());
    let dispatcher = CommandDispatcher::new(location, cli.verbose);

    let code = match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => result.exit_code,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            e.exit_code()
        }
    };
    std::process::exit(code);
}
