mod commands;

use clap::Parser;
use eclgrid_core::EclError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let error = error.as_ecl_error();
            eprintln!("{}", error.diagnostic_line());
            error.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_logging(cli.verbose);
            dispatch_parsed(cli.command, cli.config)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// Log level comes from `RUST_LOG` (default `warn`); `--verbose` forces
/// `debug`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(name = "eclgrid", about = "ECLIPSE grid and field property toolkit")]
struct Cli {
    /// Processing config (JSON) for deck based commands
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Summarise an EGRID file
    Inspect(commands::InspectArgs),
    /// Build the grid and field properties of a text deck and summarise them
    Deck(commands::DeckArgs),
    /// Write the grid of a text deck as an EGRID file
    Convert(commands::ConvertArgs),
    /// List the Fortran records of a binary file
    Records(commands::RecordsArgs),
}

fn dispatch_parsed(command: CliCommand, config: Option<PathBuf>) -> Result<i32, CliError> {
    match command {
        CliCommand::Inspect(args) => commands::run_inspect_command(args),
        CliCommand::Deck(args) => commands::run_deck_command(args, config.as_deref()),
        CliCommand::Convert(args) => commands::run_convert_command(args, config.as_deref()),
        CliCommand::Records(args) => commands::run_records_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(#[from] EclError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn compute(error: impl Into<EclError>) -> Self {
        Self::Compute(error.into())
    }

    fn as_ecl_error(&self) -> EclError {
        match self {
            Self::Usage(message) => EclError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => EclError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
