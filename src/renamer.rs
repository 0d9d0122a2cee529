//! Batch renaming of the files in one folder.
//!
//! A sweep lists the folder, skips the tool's own files, computes a new name
//! for every remaining file and moves it, one file at a time. Problems with a
//! single file are written to the [`OperationLog`] and the sweep moves on; a
//! missing folder ends the operation before anything is touched.

use crate::fs::{FileSystem, OsFileSystem};
use crate::logging::TracingLogger;
use crate::operation_log::{LOG_FILE_PREFIX, OperationLog};
use crate::patterns::PatternList;
use crate::sanitizer::Sanitizer;
use crate::settings::{
    FolderSettingsLoader, REPLACE_PATTERNS_FILE_NAME, SETTINGS_FILE_NAME, SettingsLoader,
};
use glob::Pattern;
use indicatif::ProgressBar;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// One file of a sweep and the name computed for it.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub original_path: PathBuf,
    pub original_file_name: String,
    pub sanitized_file_name: String,
}

impl FileCandidate {
    fn new(original_path: PathBuf, transform: &dyn Fn(&str) -> String) -> Self {
        let original_file_name = original_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let sanitized_file_name = transform(&original_file_name);
        Self {
            original_path,
            original_file_name,
            sanitized_file_name,
        }
    }

    /// Compares against the raw on-disk name, so a non-UTF-8 name is never
    /// mistaken for its lossy conversion.
    fn is_unchanged(&self) -> bool {
        Some(OsStr::new(&self.sanitized_file_name)) == self.original_path.file_name()
    }
}

/// Files the tool reads or writes itself; a sweep never renames them.
struct ArtifactFilter {
    file_names: [&'static str; 2],
    patterns: Vec<Pattern>,
}

impl ArtifactFilter {
    fn new() -> Self {
        let log_files = format!("{}*", Pattern::escape(LOG_FILE_PREFIX));
        Self {
            file_names: [SETTINGS_FILE_NAME, REPLACE_PATTERNS_FILE_NAME],
            patterns: Pattern::new(&log_files).into_iter().collect(),
        }
    }

    fn is_artifact(&self, file_name: &str) -> bool {
        self.file_names.contains(&file_name)
            || self.patterns.iter().any(|pattern| pattern.matches(file_name))
    }
}

/// Renames the files of a working folder.
pub struct BatchRenamer {
    folder: PathBuf,
    fs: Rc<dyn FileSystem>,
    settings_loader: Box<dyn SettingsLoader>,
    artifacts: ArtifactFilter,
    dry_run: bool,
    progress: Option<ProgressBar>,
}

impl BatchRenamer {
    /// Creates a renamer over the real file system, reading settings and
    /// replace patterns from `folder` itself.
    ///
    /// An empty `folder` means the current directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filesanitizer::BatchRenamer;
    /// use std::path::Path;
    ///
    /// let log = BatchRenamer::new(Path::new("/path/to/downloads")).rename_to_meet_os_requirements();
    /// for error in &log.errors {
    ///     eprintln!("{}", error);
    /// }
    /// println!("Renamed {} file(s)", log.renamed.len());
    /// ```
    pub fn new(folder: &Path) -> Self {
        let folder = resolve_folder(folder);
        let fs: Rc<dyn FileSystem> = Rc::new(OsFileSystem);
        let loader = FolderSettingsLoader::new(fs.clone(), Rc::new(TracingLogger), &folder);
        Self::with_capabilities(&folder, fs, Box::new(loader))
    }

    /// Creates a renamer over injected capabilities. `folder` is used as is.
    pub fn with_capabilities(
        folder: &Path,
        fs: Rc<dyn FileSystem>,
        settings_loader: Box<dyn SettingsLoader>,
    ) -> Self {
        Self {
            folder: folder.to_path_buf(),
            fs,
            settings_loader,
            artifacts: ArtifactFilter::new(),
            dry_run: false,
            progress: None,
        }
    }

    /// In a dry run every decision is made and logged, but nothing is moved.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Attaches a progress bar; its length is set once the folder is listed.
    pub fn with_progress_bar(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Renames every file in the folder to its sanitized name.
    ///
    /// Settings and replace patterns are loaded once, at the start, and used
    /// for the whole sweep.
    pub fn rename_to_meet_os_requirements(&self) -> OperationLog {
        let mut log = OperationLog::new();
        log.info(format!(
            "Starting to sanitize filenames in folder: {}",
            self.folder.display()
        ));

        let sanitizer = self.load_sanitizer(&mut log);
        self.sweep(&mut log, &|name: &str| sanitizer.sanitize(name));
        log
    }

    /// Renames every file in the folder by removing each of the
    /// newline-separated `patterns` (case-insensitive, literal).
    pub fn rename_removing_patterns(&self, patterns: &str) -> OperationLog {
        let mut log = OperationLog::new();
        log.info(format!(
            "Removing patterns from filenames in folder: {}",
            self.folder.display()
        ));

        let list = PatternList::from_lines(patterns);
        if list.is_empty() {
            log.warning("No patterns given. Nothing to remove.");
            return log;
        }

        let compiled = match list.compile() {
            Ok(compiled) => compiled,
            Err(e) => {
                log.error(e.to_string());
                return log;
            }
        };

        log.info(format!("Patterns to remove: {}", list.as_slice().join(", ")));
        self.sweep(&mut log, &|name: &str| compiled.remove_all(name));
        log
    }

    fn load_sanitizer(&self, log: &mut OperationLog) -> Sanitizer {
        let settings = self.settings_loader.load_settings();
        let patterns = self.settings_loader.load_replace_patterns();

        match Sanitizer::new(settings, patterns) {
            Ok(sanitizer) => {
                log.info(format!(
                    "Using replacement character '{}'",
                    sanitizer.settings().replacement_character
                ));
                sanitizer
            }
            Err(e) => {
                log.warning(format!("{}. Using default settings.", e));
                Sanitizer::default()
            }
        }
    }

    fn sweep(&self, log: &mut OperationLog, transform: &dyn Fn(&str) -> String) {
        let Some(files) = self.files_in_working_folder(log) else {
            return;
        };

        log.info(format!(
            "Found {} file(s) in folder: {}",
            files.len(),
            self.folder.display()
        ));
        if let Some(progress) = &self.progress {
            progress.set_length(files.len() as u64);
        }

        for path in files {
            log.info(format!("Processing file: {}", path.display()));
            let candidate = FileCandidate::new(path, transform);
            log.info(format!(
                "Sanitized filename: {}",
                candidate.sanitized_file_name
            ));

            if self.should_rename(&candidate, log) {
                self.try_rename(&candidate, log);
            } else {
                log.info(format!(
                    "Skipping file: {}",
                    candidate.original_path.display()
                ));
            }

            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }
    }

    fn files_in_working_folder(&self, log: &mut OperationLog) -> Option<Vec<PathBuf>> {
        if !self.fs.directory_exists(&self.folder) {
            log.error(format!("Folder '{}' does not exist.", self.folder.display()));
            return None;
        }

        let all_files = match self.fs.list_files(&self.folder) {
            Ok(files) => files,
            Err(e) => {
                log.error(format!(
                    "Failed to list files in folder '{}': {}",
                    self.folder.display(),
                    e
                ));
                return None;
            }
        };

        let mut files = Vec::with_capacity(all_files.len());
        for path in all_files {
            let file_name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            if self.artifacts.is_artifact(&file_name) {
                log.info(format!("Ignoring reserved file name: {}", file_name));
                continue;
            }
            files.push(path);
        }
        Some(files)
    }

    fn should_rename(&self, candidate: &FileCandidate, log: &mut OperationLog) -> bool {
        if candidate.sanitized_file_name.trim().is_empty() {
            log.error(format!(
                "File '{}' has an empty sanitized filename. Skipping.",
                candidate.original_path.display()
            ));
            return false;
        }

        if candidate.is_unchanged() {
            log.warning(format!(
                "File '{}' is already sanitized. Skipping.",
                candidate.original_file_name
            ));
            return false;
        }

        true
    }

    fn try_rename(&self, candidate: &FileCandidate, log: &mut OperationLog) {
        let original = &candidate.original_path;
        let destination = self.folder.join(&candidate.sanitized_file_name);

        if self.fs.file_exists(&destination) {
            log.error(format!(
                "File '{}' already exists. Skipping rename for '{}'.",
                destination.display(),
                original.display()
            ));
            return;
        }

        if self.dry_run {
            log.info(format!(
                "Would rename '{}' to '{}'",
                original.display(),
                destination.display()
            ));
            log.record_rename(original.clone(), destination);
            return;
        }

        match self.fs.move_file(original, &destination) {
            Ok(()) => {
                log.info(format!(
                    "Renamed '{}' to '{}'",
                    original.display(),
                    destination.display()
                ));
                log.record_rename(original.clone(), destination);
            }
            Err(e) => {
                log.error(format!(
                    "Error renaming file '{}' to '{}': {}",
                    original.display(),
                    destination.display(),
                    e
                ));
            }
        }
    }
}

fn resolve_folder(folder: &Path) -> PathBuf {
    if folder.as_os_str().is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }
    std::path::absolute(folder).unwrap_or_else(|_| folder.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory::MemoryFileSystem;
    use crate::settings::{FixedSettingsLoader, SanitizerSettings};

    const WORK: &str = "/work";

    fn path(name: &str) -> PathBuf {
        Path::new(WORK).join(name)
    }

    fn renamer_over(fs: &Rc<MemoryFileSystem>, settings: SanitizerSettings) -> BatchRenamer {
        BatchRenamer::with_capabilities(
            Path::new(WORK),
            fs.clone(),
            Box::new(FixedSettingsLoader::new(settings)),
        )
    }

    fn underscore() -> SanitizerSettings {
        SanitizerSettings::default().with_replacement("_")
    }

    fn fs_with(names: &[&str]) -> Rc<MemoryFileSystem> {
        let fs = MemoryFileSystem::with_dir(WORK);
        for name in names {
            fs.add_file(path(name), name);
        }
        Rc::new(fs)
    }

    #[test]
    fn test_renames_to_sanitized_names() {
        let fs = fs_with(&["my file.txt", "COM1.txt", "report?.pdf"]);

        let log = renamer_over(&fs, underscore()).rename_to_meet_os_requirements();

        assert!(!log.has_errors(), "errors: {:?}", log.errors);
        assert!(fs.contains(path("my_file.txt")));
        assert!(fs.contains(path("_COM1.txt")));
        assert!(fs.contains(path("report.pdf")));
        assert!(!fs.contains(path("my file.txt")));
        assert_eq!(fs.content(path("_COM1.txt")).as_deref(), Some("COM1.txt"));
        assert_eq!(log.renamed.len(), 3);
    }

    #[test]
    fn test_already_sanitized_is_a_warning() {
        let fs = fs_with(&["clean.txt"]);

        let log = renamer_over(&fs, underscore()).rename_to_meet_os_requirements();

        assert!(!log.has_errors());
        assert_eq!(log.warnings.len(), 1);
        assert!(log.warnings[0].contains("already sanitized"));
        assert_eq!(fs.move_calls(), 0);
    }

    #[test]
    fn test_collision_is_never_overwritten() {
        let fs = fs_with(&["a b.txt", "a_b.txt"]);

        let log = renamer_over(&fs, underscore()).rename_to_meet_os_requirements();

        assert_eq!(log.errors.len(), 1);
        assert!(log.errors[0].contains("already exists"));
        assert_eq!(fs.move_calls(), 0);
        assert_eq!(fs.content(path("a_b.txt")).as_deref(), Some("a_b.txt"));
        assert!(fs.contains(path("a b.txt")));
    }

    #[test]
    fn test_empty_sanitized_name_is_an_error() {
        let fs = fs_with(&["..."]);

        let log = renamer_over(&fs, underscore()).rename_to_meet_os_requirements();

        assert_eq!(log.errors.len(), 1);
        assert!(log.errors[0].contains("empty sanitized filename"));
        assert_eq!(fs.move_calls(), 0);
    }

    #[test]
    fn test_move_failure_does_not_abort_the_batch() {
        let fs = fs_with(&["a b.txt", "c d.txt"]);
        fs.fail_moves_from(path("a b.txt"));

        let log = renamer_over(&fs, underscore()).rename_to_meet_os_requirements();

        assert_eq!(log.errors.len(), 1);
        assert!(log.errors[0].contains("Error renaming file"));
        assert!(log.errors[0].contains("access is denied"));
        assert!(fs.contains(path("a b.txt")));
        assert!(fs.contains(path("c_d.txt")));
        assert_eq!(log.renamed.len(), 1);
    }

    #[test]
    fn test_missing_folder_is_a_single_error() {
        let fs = Rc::new(MemoryFileSystem::default());

        let log = renamer_over(&fs, underscore()).rename_to_meet_os_requirements();

        assert_eq!(log.errors.len(), 1);
        assert!(log.errors[0].contains("does not exist"));
        assert!(log.renamed.is_empty());
        assert!(!log.has_warnings());
    }

    #[test]
    fn test_own_files_are_ignored() {
        let fs = fs_with(&[
            SETTINGS_FILE_NAME,
            REPLACE_PATTERNS_FILE_NAME,
            "FileNameSanitizer.log.2025.01.02.03.04.05.txt",
        ]);

        let log = renamer_over(&fs, underscore()).rename_to_meet_os_requirements();

        assert!(!log.has_errors_or_warnings());
        assert_eq!(
            log.info
                .iter()
                .filter(|line| line.starts_with("Ignoring reserved file name"))
                .count(),
            3
        );
    }

    #[test]
    fn test_dry_run_moves_nothing() {
        let fs = fs_with(&["a b.txt"]);

        let log = renamer_over(&fs, underscore())
            .dry_run(true)
            .rename_to_meet_os_requirements();

        assert_eq!(fs.move_calls(), 0);
        assert!(fs.contains(path("a b.txt")));
        assert_eq!(log.renamed.len(), 1);
        assert!(log.info.iter().any(|line| line.starts_with("Would rename")));
    }

    #[test]
    fn test_removing_patterns() {
        let fs = fs_with(&["prefix-test.txt", "report_OLD.doc", "notes.bak.md"]);

        let log = renamer_over(&fs, underscore())
            .rename_removing_patterns("prefix-\n_old\n\n.bak");

        assert!(!log.has_errors(), "errors: {:?}", log.errors);
        assert!(fs.contains(path("test.txt")));
        assert!(fs.contains(path("report.doc")));
        assert!(fs.contains(path("notes.md")));
    }

    #[test]
    fn test_removing_everything_is_an_error() {
        let fs = fs_with(&["old"]);

        let log = renamer_over(&fs, underscore()).rename_removing_patterns("OLD");

        assert_eq!(log.errors.len(), 1);
        assert!(log.errors[0].contains("empty sanitized filename"));
        assert!(fs.contains(path("old")));
    }

    #[test]
    fn test_no_patterns_is_a_warning() {
        let fs = fs_with(&["a.txt"]);

        let log = renamer_over(&fs, underscore()).rename_removing_patterns("\n\n");

        assert_eq!(log.warnings.len(), 1);
        assert_eq!(fs.move_calls(), 0);
    }

    #[test]
    fn test_invalid_settings_fall_back_to_defaults() {
        let fs = fs_with(&["a?b.txt"]);
        let settings = SanitizerSettings::default().with_replacement("/");

        let log = renamer_over(&fs, settings).rename_to_meet_os_requirements();

        assert!(log.warnings[0].contains("Using default settings"));
        let expected = format!("a{}b.txt", crate::settings::default_replacement_character());
        assert!(fs.contains(path(&expected)));
    }

    #[test]
    fn test_artifact_filter() {
        let filter = ArtifactFilter::new();
        assert!(filter.is_artifact("sanitizer_settings.json"));
        assert!(filter.is_artifact("FileNameSanitizer.log.2025.11.09.14.30.52.txt"));
        assert!(!filter.is_artifact("FileNameSanitizer.txt"));
        assert!(!filter.is_artifact("settings.json"));
    }
}
