// rmatch - reconcile spreadsheet rosters from the command line

mod exit_codes;
mod preview;
mod recon;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rostermatch_io::LoadError;
use rostermatch_recon::ReconError;

use exit_codes::{load_exit_code, recon_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use recon::{IdsArgs, OutputArgs, TablesArgs};

#[derive(Parser)]
#[command(name = "rmatch")]
#[command(about = "Match spreadsheet rosters by key columns or pasted ID lists")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a search file against a main file on paired key columns
    #[command(after_help = "\
Examples:
  rmatch tables roster.xlsx found.csv --on 'Student ID=sid'
  rmatch tables roster.xlsx found.csv --on id=sid --on surname=last --out matched.xlsx
  rmatch tables a.csv b.csv --main-col id --search-col student_id --missing-out missing.csv
  rmatch tables a.csv b.csv --on id=id --json")]
    Tables(TablesArgs),

    /// Filter a main file to rows whose columns contain pasted IDs
    #[command(after_help = "\
Examples:
  rmatch ids roster.xlsx --column 'Student ID' --ids '12345, 67890'
  rmatch ids roster.xlsx -c 'Student ID' -c Email --ids-file ids.txt --out filtered.xlsx
  pbpaste | rmatch ids roster.csv -c id")]
    Ids(IdsArgs),

    /// Run a job described by a TOML file
    #[command(after_help = "\
Examples:
  rmatch run intake.rmatch.toml
  rmatch run intake.rmatch.toml --json
  rmatch run intake.rmatch.toml --out override.xlsx")]
    Run {
        /// Path to the job file
        config: std::path::PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check a job file without loading any data
    Validate {
        /// Path to the job file
        config: std::path::PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("RMATCH_COMMIT"), ")",
        "\nengine:  rostermatch-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("RMATCH_TARGET"),
    )
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Tables(args) => recon::cmd_tables(args, cli.quiet),
        Commands::Ids(args) => recon::cmd_ids(args, cli.quiet),
        Commands::Run { config, output } => recon::cmd_run(config, output, cli.quiet),
        Commands::Validate { config } => recon::cmd_validate(config, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::Arity { .. } => {
                Some("pick key columns with --on MAIN=SEARCH (tables) or --column (ids)")
            }
            ReconError::EmptyQuery => Some("pass IDs with --ids, --ids-file, or on stdin"),
            _ => None,
        };
        Self {
            code: recon_exit_code(&err),
            message: err.to_string(),
            hint: hint.map(String::from),
        }
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Table(inner) => inner.into(),
            other => {
                let hint = match &other {
                    LoadError::UnsupportedFormat(_) => {
                        Some("save the file as .csv or .xlsx and try again".to_string())
                    }
                    LoadError::EmptyFile(_) => {
                        Some("the first row must hold the column names".to_string())
                    }
                    _ => None,
                };
                Self { code: load_exit_code(&other), message: other.to_string(), hint }
            }
        }
    }
}
