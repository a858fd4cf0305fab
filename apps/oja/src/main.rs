//! oja: uploads production files to an OJS submission.
//!
//! `oja 8661` finds the folder for submission 8661 in the current directory,
//! compares it with what is already online and uploads the difference.

use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::Colorize;

mod commands;
mod input;
mod prompt;
mod render;

#[derive(Parser)]
#[command(name = "oja")]
#[command(about = "Upload production galleys to an OJS submission")]
#[command(version)]
struct Cli {
    /// Submission ID (e.g. 8661) or path to the submission folder
    input: Option<String>,

    /// Re-enter and save the OJS connection settings
    #[arg(long)]
    settings: bool,

    /// Show the plan without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Skip confirmation prompts and pick the safest option automatically
    #[arg(long)]
    skip: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.input.is_none() && !cli.settings {
        // Printing help can only fail on a closed stdout.
        if Cli::command().print_help().is_ok() {
            println!();
        }
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{} Failed to start runtime: {e}", "ERROR".red());
            return ExitCode::FAILURE;
        }
    };

    match run_interruptible(runtime, run(cli), tokio::signal::ctrl_c()) {
        None => {
            eprintln!("\n{}", "Operation cancelled".yellow());
            ExitCode::FAILURE
        }
        Some(Ok(())) => ExitCode::SUCCESS,
        Some(Err(e)) => {
            eprintln!("{} {e:#}", "ERROR".red());
            ExitCode::FAILURE
        }
    }
}

/// Drives `work` until it finishes or `interrupt` fires, `None` on interrupt.
///
/// The runtime is shut down without waiting, so a prompt still blocked on
/// terminal input does not keep the process alive.
fn run_interruptible<T>(
    runtime: tokio::runtime::Runtime,
    work: impl Future<Output = T>,
    interrupt: impl Future,
) -> Option<T> {
    let outcome = runtime.block_on(async {
        tokio::select! {
            value = work => Some(value),
            _ = interrupt => None,
        }
    });
    runtime.shutdown_background();
    outcome
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let loaded = oja_config::load_merged(&cwd)?;

    let level = if cli.debug {
        "debug"
    } else {
        loaded.config.logging.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    render::config_notices(&loaded);

    match cli.input {
        Some(input) => {
            let args = commands::run::RunArgs {
                input,
                settings: cli.settings,
                dry_run: cli.dry_run,
                debug: cli.debug,
                skip: cli.skip,
            };
            commands::run::execute(&args, loaded.config).await
        }
        None => commands::settings::execute(loaded.config).await.map(|_| ()),
    }
}
