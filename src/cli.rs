//! Command-line interface module for vypack.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Configuration loading and validation
//! - Running the pipeline with a progress bar
//! - Reporting the outcome and choosing the exit status

use crate::config::{PackConfig, PackOptions};
use crate::output::OutputFormatter;
use crate::pipeline::{Pipeline, RunReport};
use crate::scanner::ExtensionMatch;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Package a raw asset tree into a resource bundle.
#[derive(Debug, Clone, Parser)]
#[command(name = "vypack", version, about)]
pub struct Args {
    /// Directory holding the raw assets.
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Directory receiving `resources/` and `resource.json`.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Leave audio files out of the bundle.
    #[arg(long)]
    pub ignore_sound: bool,

    /// Log every file as it is handled.
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (defaults to .vypackrc.toml, then ~/.config/vypack/config.toml).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of files copied at the same time.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Length of generated identifier tokens.
    #[arg(long, value_name = "N")]
    pub id_length: Option<usize>,

    /// Extension matching rule: exact or contains.
    #[arg(long = "match", value_name = "MODE")]
    pub extension_match: Option<ExtensionMatch>,
}

impl Args {
    fn to_options(&self) -> PackOptions {
        PackOptions {
            input_root: self.input.clone(),
            output_root: self.output.clone(),
            ignore_sound: self.ignore_sound,
            verbose: self.verbose,
            concurrency: self.jobs,
            identifier_length: self.id_length,
            extension_match: self.extension_match,
        }
    }
}

/// How a CLI invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Manifest written, no issues.
    Success,
    /// Manifest may be written, but some files or directories had problems.
    CompletedWithIssues,
    /// The run never started.
    ConfigurationError,
}

impl RunStatus {
    /// Classifies a finished run.
    pub fn from_report(report: &RunReport) -> Self {
        if report.is_complete_success() {
            RunStatus::Success
        } else {
            RunStatus::CompletedWithIssues
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            RunStatus::Success => ExitCode::SUCCESS,
            RunStatus::CompletedWithIssues => ExitCode::from(2),
            RunStatus::ConfigurationError => ExitCode::from(1),
        }
    }
}

/// Runs the CLI application with parsed arguments.
///
/// Configuration problems are reported and yield
/// [`RunStatus::ConfigurationError`] without touching the output directory.
///
/// # Errors
///
/// Returns an error only if the async runtime cannot be started.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use vypack::cli::{Args, run_cli};
///
/// let args = Args::parse_from(["vypack", "--input", "assets", "--output", "dist"]);
/// let status = run_cli(&args).expect("runtime available");
/// println!("{:?}", status);
/// ```
pub fn run_cli(args: &Args) -> anyhow::Result<RunStatus> {
    let file = match PackConfig::load(args.config.as_deref()) {
        Ok(file) => file,
        Err(e) => {
            tracing::error!("{}", e);
            OutputFormatter::error(&format!("Error loading configuration: {}", e));
            return Ok(RunStatus::ConfigurationError);
        }
    };

    let config = match args.to_options().into_run_config(file) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            OutputFormatter::error(&e.to_string());
            return Ok(RunStatus::ConfigurationError);
        }
    };

    OutputFormatter::info(&format!(
        "Packaging {} into {}",
        config.input_root.display(),
        config.output_root.display()
    ));

    let pipeline = Pipeline::new(config).with_progress(OutputFormatter::create_progress_bar());
    let report = pipeline
        .run_blocking()
        .context("Failed to start the async runtime")?;

    print_report(&report, pipeline.config().verbose());
    Ok(RunStatus::from_report(&report))
}

fn print_report(report: &RunReport, verbose: bool) {
    if report.discovered == 0 {
        OutputFormatter::warning("No recognized asset files found.");
    }

    if verbose {
        OutputFormatter::packaged_files(&report.manifest);
    }
    OutputFormatter::summary_table(report);
    OutputFormatter::issues(report);

    if report.finalized {
        OutputFormatter::success(&format!(
            "Manifest written to {}",
            report.manifest_path.display()
        ));
    } else {
        OutputFormatter::error("Manifest was not written.");
    }

    if !report.issues.is_empty() {
        OutputFormatter::warning(&format!(
            "Completed with {} issue(s). Please review errors above.",
            report.issues.len()
        ));
    }
}
