//! skillsync - skill sync CLI
//!
//! Discover, compare, sync and back up AI assistant skills across platforms.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use skillsync::Result;
use skillsync::app::AppContext;
use skillsync::cli::Cli;
use skillsync::cli::commands::{self, CommandStatus};
use skillsync::cli::output::{emit_json, robot_error};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            if cli.robot {
                // Robot mode: JSON error output to stdout
                if emit_json(&robot_error(&e)).is_err() {
                    eprintln!("Error: {e}");
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<CommandStatus> {
    let ctx = AppContext::from_cli(cli)?;
    commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,skillsync=info",
        1 => "info,skillsync=debug",
        2 => "debug,skillsync=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
