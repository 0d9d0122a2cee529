//! Terminal output for the CLI.
//!
//! All styling lives here: colored status lines, the sweep progress bar and
//! the end-of-run summary. Nothing in the library core prints.

use crate::operation_log::OperationLog;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Prints CLI output with consistent styling.
///
/// - Success lines are green with ✓
/// - Errors go to stderr in red with ✗
/// - Warnings are yellow with ⚠
/// - Info is cyan
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesanitizer::output::OutputFormatter;
    /// OutputFormatter::success("Renamed 3 files");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message to stderr in red.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesanitizer::output::OutputFormatter;
    /// OutputFormatter::error("Folder '/tmp/missing' does not exist.");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a bold section header preceded by a blank line.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for a sweep.
    ///
    /// The total may be unknown when the bar is created; the renamer sets the
    /// length once the folder has been listed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesanitizer::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(0);
    /// pb.set_length(10);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints the errors and warnings of a sweep, and its info lines when
    /// `verbose` is set.
    pub fn print_log(log: &OperationLog, verbose: bool) {
        if verbose && log.has_info() {
            Self::header("DETAILS");
            for line in &log.info {
                Self::info(line);
            }
        }

        if log.has_warnings() {
            Self::header("WARNINGS");
            for line in &log.warnings {
                Self::warning(line);
            }
        }

        if log.has_errors() {
            Self::header("ERRORS");
            for line in &log.errors {
                Self::error(line);
            }
        }
    }

    /// Prints the renamed, skipped and failed counts of a sweep.
    ///
    /// In a dry run the renames are listed as proposals.
    pub fn summary(log: &OperationLog, dry_run: bool) {
        Self::header("SUMMARY");

        for renamed in &log.renamed {
            println!(
                "  {} {} {}",
                file_name(&renamed.from),
                "→".green(),
                file_name(&renamed.to)
            );
        }
        if !log.renamed.is_empty() {
            println!("{}", "-".repeat(30));
        }

        let renamed_label = if dry_run { "Would rename" } else { "Renamed" };
        let rows = [
            (renamed_label, log.renamed.len(), Color::Green),
            ("Skipped", log.warnings.len(), Color::Yellow),
            ("Errors", log.errors.len(), Color::Red),
        ];
        for (label, count, color) in rows {
            println!(
                "{:<12} | {} {}",
                label,
                count.to_string().color(color),
                plural_files(count)
            );
        }
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural_files(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
