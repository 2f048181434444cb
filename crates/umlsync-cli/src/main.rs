use std::io::Read;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use umlsync::sync::{ExportDocument, GuiState, generate, gui_from_code};
use umlsync::{DEFAULT_MAX_LINES, extract, parse_source, repair_source};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sync(#[from] umlsync::sync::SyncError),
    #[error("{0} diagnostic(s) reported")]
    Diagnostics(usize),
    #[error("no diagram could be parsed")]
    NoDiagram,
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Diagnostics(_) | Self::NoDiagram => 3,
            _ => 1,
        }
    }
}

/// Inspect and convert PlantUML sequence diagrams.
///
/// Input is read from FILE, or from stdin when FILE is omitted or `-`.
#[derive(Debug, Parser)]
#[command(name = "umlsync", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the token stream and lexical diagnostics as JSON.
    Tokens { input: Option<String> },
    /// Print tokens, AST, diagnostics and statistics as JSON.
    Parse {
        /// Exit with status 3 if any diagnostic was raised.
        #[arg(long)]
        strict: bool,
        input: Option<String>,
    },
    /// Print the regex-extracted actors and messages as JSON.
    Extract { input: Option<String> },
    /// Print the source with directives, line endings and blank runs fixed.
    Repair {
        #[arg(long, default_value_t = DEFAULT_MAX_LINES)]
        max_lines: usize,
        input: Option<String>,
    },
    /// Read a GUI state JSON document and print the PlantUML it generates.
    Generate { input: Option<String> },
    /// Print the JSON export (condition blocks plus PlantUML) of a diagram.
    Export { input: Option<String> },
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let pretty = cli.pretty;
    match cli.command {
        Command::Tokens { input } => {
            let text = read_input(input.as_deref())?;
            write_json(&umlsync::sequence::tokenize(&text), pretty)
        }
        Command::Parse { strict, input } => {
            let text = read_input(input.as_deref())?;
            let outcome = parse_source(&text);
            tracing::debug!(
                errors = outcome.errors.len(),
                diagram = outcome.document.is_some(),
                "parsed input"
            );
            write_json(&outcome, pretty)?;
            if outcome.document.is_none() {
                return Err(CliError::NoDiagram);
            }
            if strict && outcome.has_errors() {
                return Err(CliError::Diagnostics(outcome.errors.len()));
            }
            Ok(())
        }
        Command::Extract { input } => {
            let text = read_input(input.as_deref())?;
            write_json(&extract(&text), pretty)
        }
        Command::Repair { max_lines, input } => {
            let text = read_input(input.as_deref())?;
            let repaired = repair_source(&text, max_lines);
            println!("{}", repaired.code);
            Ok(())
        }
        Command::Generate { input } => {
            let text = read_input(input.as_deref())?;
            let state: GuiState = serde_json::from_str(&text)?;
            println!("{}", generate(&state));
            Ok(())
        }
        Command::Export { input } => {
            let text = read_input(input.as_deref())?;
            let state = gui_from_code(&text).ok_or(CliError::NoDiagram)?;
            let export = ExportDocument::from_state(&state, chrono::Utc::now())?;
            write_json(&export, pretty)
        }
    }
}

fn main() {
    let filter =
        EnvFilter::try_from_env("UMLSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // clap exits with status 2 on usage errors.
    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "running command");
    if let Err(err) = run(cli) {
        tracing::debug!(exit_code = err.exit_code(), "command failed");
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}
