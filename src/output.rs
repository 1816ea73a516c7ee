//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and the end-of-run summary table.

use crate::category::Category;
use crate::manifest::ResourceManifest;
use crate::pipeline::RunReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for the copy phase
/// - Summary tables with per-category counts
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use vypack::output::OutputFormatter;
    /// OutputFormatter::success("Bundle written");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for the copy phase.
    ///
    /// The length is left at zero; the pipeline sets it once scanning is done.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use vypack::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar();
    /// pb.set_length(10);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints the per-category summary table for a finished run.
    pub fn summary_table(report: &RunReport) {
        Self::header("SUMMARY");

        let rows: Vec<(&str, usize)> = report
            .manifest
            .counts()
            .iter()
            .map(|(category, count)| (category.dir_name(), *count))
            .collect();

        let width = rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Category" width

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (name, count) in &rows {
            println!(
                "{:<width$} | {} {}",
                name,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            report.copied.to_string().green().bold(),
            plural(report.copied),
            width = width
        );

        if report.skipped > 0 {
            println!(
                "{:<width$} | {} {}",
                "Skipped",
                report.skipped.to_string().yellow(),
                plural(report.skipped),
                width = width
            );
        }
    }

    /// Prints every packaged file, grouped by category.
    pub fn packaged_files(manifest: &ResourceManifest) {
        for category in Category::ALL {
            let records = manifest.records(category);
            if records.is_empty() {
                continue;
            }
            Self::header(category.description());
            for record in records {
                println!(
                    "  {} {} {}",
                    record.file_name,
                    "→".dimmed(),
                    format!("{}/{}", category.dir_name(), record.resource_identifier).cyan()
                );
            }
        }
    }

    /// Prints every non-fatal issue of a run.
    pub fn issues(report: &RunReport) {
        if report.issues.is_empty() {
            return;
        }
        Self::header("ISSUES");
        for issue in &report.issues {
            Self::error(&issue.to_string());
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
