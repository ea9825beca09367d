// polecheck - reconcile field-survey pole loading against structural analysis

mod compare;
mod cover;
mod exit_codes;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use polecheck_config::{ConfigError, Settings};
use polecheck_io::IoError;
use polecheck_recon::ReconError;

use exit_codes::{config_exit_code, io_exit_code, recon_exit_code, EXIT_SUCCESS, EXIT_USAGE, EXIT_WRITE};

#[derive(Parser)]
#[command(name = "polecheck")]
#[command(about = "Compare field-survey pole loading against structural analysis results")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/polecheck/settings.toml)
    #[arg(long, global = true, env = "POLECHECK_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a field survey against a structural-analysis export
    #[command(after_help = "\
Examples:
  polecheck compare survey.xlsx analysis.json
  polecheck compare survey.csv analysis.json --threshold 10 --issues-only
  polecheck compare survey.xlsx analysis.json --csv out/
  polecheck compare survey.xlsx analysis.json --json > report.json")]
    Compare {
        /// Field survey (.xlsx, .xlsm, .xls, .xlsb, .ods, .csv, .tsv)
        survey: PathBuf,

        /// Structural-analysis export (.json)
        analysis: PathBuf,

        /// Loading delta in percentage points (1-20) above which a pole is flagged
        #[arg(long, short = 't')]
        threshold: Option<f64>,

        /// Write the comparison as CSV (a directory gets pole_comparison_results.csv)
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,

        /// Print the full report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Only show flagged poles in the table and CSV
        #[arg(long)]
        issues_only: bool,

        /// Exit 1 when any pole is flagged
        #[arg(long)]
        fail_on_issues: bool,
    },

    /// Build the cover-sheet header and pole table from an analysis export
    #[command(after_help = "\
Examples:
  polecheck cover-sheet analysis.json
  polecheck cover-sheet analysis.json --no-geocode
  polecheck cover-sheet analysis.json --client \"Acme Fiber\" --json")]
    CoverSheet {
        /// Structural-analysis export (.json)
        analysis: PathBuf,

        /// Skip the reverse-geocoding request
        #[arg(long)]
        no_geocode: bool,

        /// Client name for the header (overrides settings)
        #[arg(long)]
        client: Option<String>,

        /// Print the cover sheet as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the settings file location and effective settings
    Config {
        /// Write a default settings file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  polecheck-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  polecheck-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
        )
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compare { survey, analysis, threshold, csv, json, issues_only, fail_on_issues } => {
            compare::cmd_compare(compare::CompareArgs {
                survey,
                analysis,
                threshold,
                csv,
                json,
                issues_only,
                fail_on_issues,
                config: cli.config,
            })
        }
        Commands::CoverSheet { analysis, no_geocode, client, json } => {
            cover::cmd_cover_sheet(analysis, no_geocode, client, json, cli.config)
        }
        Commands::Config { init } => cmd_config(cli.config, init),
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

    pub fn write(msg: impl Into<String>) -> Self {
        Self { code: EXIT_WRITE, message: msg.into(), hint: None }
    }

    pub fn io(err: IoError) -> Self {
        let hint = match &err {
            IoError::UnsupportedFormat { .. } => Some("export the survey as .xlsx or .csv, the analysis as .json".to_string()),
            IoError::Empty(_) => Some("check that the sheet has a header row and at least one data row".to_string()),
            _ => None,
        };
        Self { code: io_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingField { document: "field survey", .. } => {
                Some("rename the column or add its header under [aliases] in the settings file".to_string())
            }
            ReconError::ConfigValidation(_) => Some("run `polecheck config` to see effective settings".to_string()),
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn config(err: ConfigError) -> Self {
        Self { code: config_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    Settings::load(path).map_err(CliError::config)
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(path: Option<PathBuf>, init: bool) -> Result<(), CliError> {
    let path = path.unwrap_or_else(Settings::config_path);

    if init {
        if path.exists() {
            eprintln!("{} already exists", path.display());
        } else {
            Settings::write_default(&path).map_err(|e| CliError::write(e.to_string()))?;
            eprintln!("wrote {}", path.display());
        }
    }

    let settings = load_settings(Some(&path))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let status = if path.exists() { "" } else { " (not found, using defaults)" };
    writeln!(out, "# {}{}", path.display(), status).map_err(|e| CliError::write(e.to_string()))?;
    write!(out, "{}", settings.to_toml()).map_err(|e| CliError::write(e.to_string()))?;
    Ok(())
}
