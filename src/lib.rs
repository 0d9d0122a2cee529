//! filesanitizer - portable filenames for whole folders
//!
//! This library turns arbitrary strings into filenames that are valid on both
//! Windows and POSIX file systems, and renames the files of a folder in one
//! fail-forward sweep, either to their sanitized names or by removing literal
//! patterns. Settings and replace patterns are read from JSON and text files
//! placed in the target folder; every sweep produces an operation log that
//! can be written next to the files it describes.

pub mod cli;
pub mod fs;
pub mod logging;
pub mod operation_log;
pub mod output;
pub mod patterns;
pub mod renamer;
pub mod sanitizer;
pub mod settings;

pub use fs::{FileSystem, OsFileSystem};
pub use logging::{Logger, TracingLogger};
pub use operation_log::{LogWriteError, OperationLog, RenamedFile};
pub use patterns::{CompiledPatterns, PatternList};
pub use renamer::{BatchRenamer, FileCandidate};
pub use sanitizer::Sanitizer;
pub use settings::{
    FixedSettingsLoader, FolderSettingsLoader, SanitizerSettings, SettingsError, SettingsLoader,
};

pub use cli::{CliOptions, SanitizeCommand, run_cli};
