/// Structured record of one batch operation.
///
/// Every step of a sweep appends to the log: errors for files that could not
/// be handled, warnings for files that were skipped on purpose, info for
/// progress. Completed renames are recorded as well so callers can count them.
/// At the end of a CLI run the log is written next to the files it describes.
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of every log file written by [`OperationLog::flush_to_file`].
pub const LOG_FILE_PREFIX: &str = "FileNameSanitizer.log.";

/// A file that was renamed (or, in a dry run, would have been).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedFile {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Errors that can occur while writing the log file.
#[derive(Debug)]
pub enum LogWriteError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for LogWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Failed to write log file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LogWriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Errors, warnings, info and renames of one sweep, in the order they happened.
#[derive(Debug, Clone, Default)]
pub struct OperationLog {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
    pub renamed: Vec<RenamedFile>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.info.push(message.into());
    }

    pub fn record_rename(&mut self, from: PathBuf, to: PathBuf) {
        self.renamed.push(RenamedFile { from, to });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_info(&self) -> bool {
        !self.info.is_empty()
    }

    pub fn has_errors_or_warnings(&self) -> bool {
        self.has_errors() || self.has_warnings()
    }

    /// Name of the log file for a given local time,
    /// e.g. `FileNameSanitizer.log.2025.11.09.14.30.52.txt`.
    pub fn log_file_name(timestamp: &chrono::DateTime<Local>) -> String {
        format!(
            "{}{}.txt",
            LOG_FILE_PREFIX,
            timestamp.format("%Y.%m.%d.%H.%M.%S")
        )
    }

    /// Writes the log into `folder` and returns the path of the new file.
    ///
    /// The folder is created if it is missing.
    pub fn flush_to_file(&self, folder: &Path) -> Result<PathBuf, LogWriteError> {
        let now = Local::now();
        let log_path = folder.join(Self::log_file_name(&now));

        fs::create_dir_all(folder).map_err(|e| LogWriteError::Io {
            path: folder.to_path_buf(),
            source: e,
        })?;

        fs::write(&log_path, self.format_entries(&now)).map_err(|e| LogWriteError::Io {
            path: log_path.clone(),
            source: e,
        })?;

        Ok(log_path)
    }

    /// Renders the sectioned text written by `flush_to_file`. Empty sections
    /// are left out.
    pub fn format_entries(&self, timestamp: &chrono::DateTime<Local>) -> String {
        let mut lines = vec![
            "=== FileNameSanitizer Operation Log ===".to_string(),
            format!("Timestamp: {}", timestamp.format("%Y-%m-%d %H:%M:%S")),
            String::new(),
        ];

        for (title, entries) in [
            ("ERROR:", &self.errors),
            ("WARN:", &self.warnings),
            ("INFO:", &self.info),
        ] {
            if entries.is_empty() {
                continue;
            }
            lines.push(title.to_string());
            lines.extend(entries.iter().map(|entry| format!("- {}", entry)));
            lines.push(String::new());
        }

        lines.join("\n")
    }
}
