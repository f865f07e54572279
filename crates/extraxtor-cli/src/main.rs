//! Extraxtor CLI - Command-line utility for concurrent, path-safe archive
//! extraction.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use clap::Parser;
use extraxtor_core::CancellationToken;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Exit status used when a second interrupt aborts immediately.
const EXIT_INTERRUPTED: i32 = 130;

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

/// First Ctrl-C cancels the run so staging is cleaned up; a second one exits.
fn install_interrupt_handler(cancel: &CancellationToken) {
    let token = cancel.clone();
    ctrlc::set_handler(move || {
        if token.is_cancelled() {
            std::process::exit(EXIT_INTERRUPTED);
        }
        warn!("interrupt received, stopping extraction");
        token.cancel();
    })
    .ok();
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    setup_logging(cli.verbose, cli.quiet || cli.json);

    let operation = match &cli.command {
        cli::Commands::Extract(_) => "extract",
        cli::Commands::Inspect(_) => "inspect",
        cli::Commands::Completion(_) => "completion",
    };
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet, operation);

    let cancel = CancellationToken::new();
    install_interrupt_handler(&cancel);

    let result = match &cli.command {
        cli::Commands::Extract(args) => commands::extract::execute(
            args,
            cli.verbose,
            !cli.quiet && !cli.json,
            &*formatter,
            &cancel,
        ),
        cli::Commands::Inspect(args) => commands::inspect::execute(args, cli.verbose, &*formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}
