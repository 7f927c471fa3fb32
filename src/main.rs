mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use eternal_memory::config::Workspace;
use eternal_memory::errors::Error;
use eternal_memory::logging;

use commands::Commands;
use output::{ErrorResponse, print_json};

/// eternal-memory - Persistent semantic memory for AI agents
#[derive(Parser)]
#[command(name = "eternal-memory", version, about, long_about = None)]
struct Cli {
    /// Workspace root (default: $ETERNAL_MEMORY_WORKSPACE or ~/.openclaw/workspace)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn run(cli: &Cli) -> Result<ExitCode, Error> {
    let workspace = Workspace::resolve(cli.workspace.as_deref())?;
    tracing::debug!(workspace = %workspace.root().display(), "Workspace resolved");
    commands::execute(&cli.command, &workspace, cli.json)
}

fn report_error(error: &Error, json: bool) {
    if json {
        print_json(&ErrorResponse {
            error: error.to_string(),
            hint: error.hint().map(str::to_string),
        });
    } else {
        eprintln!("Error: {error}");
        if let Some(hint) = error.hint() {
            eprintln!("Hint: {hint}");
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            tracing::debug!(error = ?error, "Command failed");
            report_error(&error, cli.json);
            ExitCode::FAILURE
        }
    }
}
