//! ematab CLI - command-line interface for the EMA tabulator
//!
//! Commands:
//! - run: tabulate one export file into per-subject and aggregate CSVs
//! - duplicates: report subjects holding multiple session keys

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use ema_tabulator::{TabulateError, Tabulator, VERSION};

/// ematab - turn mobile EMA survey exports into flat tabular datasets
#[derive(Parser)]
#[command(name = "ematab")]
#[command(version = VERSION)]
#[command(about = "Tabulate EMA survey exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tabulate an export file into per-subject and aggregate CSVs
    Run {
        /// Input export JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory root
        #[arg(short, long)]
        output: PathBuf,

        /// Skip the tar.gz bundle of the aggregate directory
        #[arg(long)]
        skip_bundle: bool,
    },

    /// Report subjects holding multiple session keys
    Duplicates {
        /// Input export JSON file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TabulateError> {
    match cli.command {
        Commands::Run {
            input,
            output,
            skip_bundle,
        } => {
            let tabulator = Tabulator::new(input, output);

            let summary = if skip_bundle {
                tabulator.run()?
            } else {
                let (summary, archive) = tabulator.execute()?;
                println!("Bundle: {}", archive.display());
                summary
            };

            println!(
                "Tabulated {}/{} subjects ({} parent errors, {} duplicate subjects)",
                summary.subjects_aggregated,
                summary.subjects_total,
                summary.parent_errors,
                summary.duplicate_subjects
            );
            println!("Aggregates: {}", summary.aggregate_dir.display());
            Ok(())
        }

        Commands::Duplicates { input } => {
            let report = Tabulator::new(input, PathBuf::new()).duplicate_scan()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TabulateError> for CliError {
    fn from(e: TabulateError) -> Self {
        let (code, hint) = match &e {
            TabulateError::IoError(_) => ("IO_ERROR", "Check file paths and permissions"),
            TabulateError::JsonError(_) => ("JSON_ERROR", "Check the export file syntax"),
            TabulateError::CsvError(_) => ("CSV_ERROR", "Check the output directory"),
            TabulateError::MissingField(_) => ("MISSING_FIELD", "Check the export structure"),
            TabulateError::DecodeError(_) => ("DECODE_ERROR", "Check encoded answer values"),
            TabulateError::PivotConflict { .. } => {
                ("PIVOT_CONFLICT", "A ping answered the same question twice")
            }
            TabulateError::EmptyAggregate => (
                "EMPTY_AGGREGATE",
                "No subject survived tabulation; inspect the error log",
            ),
        };

        CliError {
            code: code.to_string(),
            message: e.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}
