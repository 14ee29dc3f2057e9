//! pupil-build CLI - computes the native build plan for pupil_detectors

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use pupil_build::builder::ScanError;
use pupil_build::resolver::ConfigureError;
use pupil_build::util::diagnostic::{emit, suggestions, Diagnostic};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("pupil_build=debug")
    } else {
        EnvFilter::new("pupil_build=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli) {
        emit(&to_diagnostic(&e), color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Flags(args) => commands::flags::execute(args),
        Commands::Deps(args) => commands::deps::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Render configuration failures with what was searched; anything else as
/// the plain error chain.
fn to_diagnostic(err: &anyhow::Error) -> Diagnostic {
    if let Some(e) = err.downcast_ref::<ConfigureError>() {
        return e.to_diagnostic();
    }
    if let Some(e) = err.downcast_ref::<ScanError>() {
        return e.to_diagnostic();
    }
    Diagnostic::error(format!("{:#}", err)).with_suggestion(suggestions::RUN_VERBOSE)
}
