//! Command-line interface module for filesanitizer.
//!
//! Runs one batch operation against a folder and reports it:
//! - sweep with a progress bar
//! - print errors, warnings and (verbose) info
//! - print a summary
//! - write the timestamped log file into the folder

use crate::operation_log::OperationLog;
use crate::output::OutputFormatter;
use crate::renamer::BatchRenamer;
use std::path::Path;

/// The batch operation to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeCommand {
    /// Rename every file to a name valid on Windows and POSIX.
    Sanitize,
    /// Remove newline-separated literal patterns from every file name.
    RemovePatterns { patterns: String },
}

impl SanitizeCommand {
    /// Chooses pattern removal when any pattern is given.
    pub fn from_patterns(patterns: &[String]) -> Self {
        if patterns.is_empty() {
            SanitizeCommand::Sanitize
        } else {
            SanitizeCommand::RemovePatterns {
                patterns: patterns.join("\n"),
            }
        }
    }

    fn describe(&self, folder: &Path) -> String {
        match self {
            SanitizeCommand::Sanitize => {
                format!("Sanitizing filenames in: {}", folder.display())
            }
            SanitizeCommand::RemovePatterns { .. } => {
                format!("Removing patterns from filenames in: {}", folder.display())
            }
        }
    }
}

/// Flags that shape a CLI run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliOptions {
    /// Decide and report every rename without moving anything.
    pub dry_run: bool,
    /// Also print the info entries of the operation log.
    pub verbose: bool,
    /// Write `FileNameSanitizer.log.<timestamp>.txt` into the folder.
    pub write_log_file: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            verbose: false,
            write_log_file: true,
        }
    }
}

/// Runs the CLI application with the given command and folder.
///
/// Problems with individual files are reported but do not fail the run.
///
/// # Errors
///
/// Returns an error message if the log file could not be written.
///
/// # Examples
///
/// ```no_run
/// use filesanitizer::cli::{CliOptions, SanitizeCommand, run_cli};
/// use std::path::Path;
///
/// let result = run_cli(&SanitizeCommand::Sanitize, Path::new("/path/to/folder"), CliOptions::default());
/// match result {
///     Ok(()) => println!("Operation completed"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(command: &SanitizeCommand, folder: &Path, options: CliOptions) -> Result<(), String> {
    let progress = OutputFormatter::create_progress_bar(0);
    let renamer = BatchRenamer::new(folder)
        .dry_run(options.dry_run)
        .with_progress_bar(progress.clone());

    OutputFormatter::header(&command.describe(renamer.folder()));
    if options.dry_run {
        OutputFormatter::dry_run_notice("No files will be renamed.");
    }

    let log = execute(command, &renamer);
    progress.finish_and_clear();

    OutputFormatter::print_log(&log, options.verbose);
    OutputFormatter::summary(&log, options.dry_run);

    if should_write_log_file(&options, renamer.folder()) {
        let path = log
            .flush_to_file(renamer.folder())
            .map_err(|e| e.to_string())?;
        OutputFormatter::plain(&format!("\nLog written to {}", path.display()));
    }

    if options.dry_run {
        OutputFormatter::success("Dry run complete. No files were modified.");
    } else if !log.has_errors() {
        OutputFormatter::success("Done.");
    } else {
        OutputFormatter::warning("Some files could not be renamed. Please review errors above.");
    }

    Ok(())
}

/// Runs `command` on `renamer` and returns its operation log.
pub fn execute(command: &SanitizeCommand, renamer: &BatchRenamer) -> OperationLog {
    match command {
        SanitizeCommand::Sanitize => renamer.rename_to_meet_os_requirements(),
        SanitizeCommand::RemovePatterns { patterns } => renamer.rename_removing_patterns(patterns),
    }
}

fn should_write_log_file(options: &CliOptions, folder: &Path) -> bool {
    options.write_log_file && !options.dry_run && folder.is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_from_patterns() {
        assert_eq!(SanitizeCommand::from_patterns(&[]), SanitizeCommand::Sanitize);

        let patterns = vec!["prefix-".to_string(), "_old".to_string()];
        assert_eq!(
            SanitizeCommand::from_patterns(&patterns),
            SanitizeCommand::RemovePatterns {
                patterns: "prefix-\n_old".to_string()
            }
        );
    }

    #[test]
    fn test_default_options_write_log_file() {
        let options = CliOptions::default();
        assert!(options.write_log_file);
        assert!(!options.dry_run);
        assert!(!options.verbose);
    }

    #[test]
    fn test_log_file_is_skipped_for_dry_run_and_missing_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let options = CliOptions::default();

        assert!(should_write_log_file(&options, temp_dir.path()));
        assert!(!should_write_log_file(
            &CliOptions {
                dry_run: true,
                ..options
            },
            temp_dir.path()
        ));
        assert!(!should_write_log_file(
            &CliOptions {
                write_log_file: false,
                ..options
            },
            temp_dir.path()
        ));
        assert!(!should_write_log_file(
            &options,
            &temp_dir.path().join("missing")
        ));
    }

    #[test]
    fn test_describe_mentions_mode() {
        let folder = Path::new("/work");
        assert!(SanitizeCommand::Sanitize.describe(folder).starts_with("Sanitizing"));
        let remove = SanitizeCommand::RemovePatterns {
            patterns: "x".to_string(),
        };
        assert!(remove.describe(folder).starts_with("Removing patterns"));
    }
}
