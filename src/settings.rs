//! Sanitizer settings and the capability that loads them.
//!
//! Settings are read from `sanitizer_settings.json` in the target folder:
//!
//! ```json
//! {
//!   "ReplacementCharacter": "_",
//!   "ExcludedCharacters": ["-", "@"],
//!   "EnforceWindowsReservedNames": true
//! }
//! ```
//!
//! Every key is optional. A missing file gives the defaults; an unreadable or
//! invalid file also gives the defaults, and the problem is reported through
//! the diagnostic [`Logger`]. Loading never fails a batch operation.

use crate::fs::FileSystem;
use crate::logging::Logger;
use crate::patterns::{CompiledPatterns, PatternList};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Well-known settings file name, looked up in the target folder.
pub const SETTINGS_FILE_NAME: &str = "sanitizer_settings.json";

/// Well-known replace-patterns file name, looked up in the target folder.
pub const REPLACE_PATTERNS_FILE_NAME: &str = "sanitizer_replace_patterns.txt";

/// Errors that can occur while loading settings or patterns.
#[derive(Debug)]
pub enum SettingsError {
    /// The settings file does not exist.
    NotFound(PathBuf),
    /// The file exists but could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The content is not valid settings JSON.
    Invalid(String),
    /// The replacement string would itself produce an unsafe filename.
    InvalidReplacement(String),
    /// A literal pattern could not be compiled into a matcher.
    InvalidPattern { pattern: String, reason: String },
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::NotFound(path) => {
                write!(f, "Settings file not found: {}", path.display())
            }
            SettingsError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            SettingsError::Invalid(reason) => write!(f, "Invalid settings: {}", reason),
            SettingsError::InvalidReplacement(replacement) => write!(
                f,
                "Invalid replacement character {:?}: must be non-empty and free of path separators, dots and control characters",
                replacement
            ),
            SettingsError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Replacement and exclusion policy for one sanitize run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SanitizerSettings {
    /// Inserted in place of every invalid character. Never sanitized away.
    #[serde(default = "default_replacement_character")]
    pub replacement_character: String,

    /// Characters preserved verbatim even though they are otherwise invalid.
    #[serde(default)]
    pub excluded_characters: BTreeSet<String>,

    /// Prefix Windows device names (`CON`, `COM1`, ...) with `_`.
    #[serde(default = "default_enforce_windows_reserved_names")]
    pub enforce_windows_reserved_names: bool,
}

/// Space on Windows, `-` on Unix and macOS, `_` anywhere else.
pub fn default_replacement_character() -> String {
    if cfg!(windows) {
        " ".to_string()
    } else if cfg!(unix) {
        "-".to_string()
    } else {
        "_".to_string()
    }
}

fn default_enforce_windows_reserved_names() -> bool {
    true
}

impl Default for SanitizerSettings {
    fn default() -> Self {
        Self {
            replacement_character: default_replacement_character(),
            excluded_characters: BTreeSet::new(),
            enforce_windows_reserved_names: default_enforce_windows_reserved_names(),
        }
    }
}

impl SanitizerSettings {
    /// Defaults, with the reserved-name guard enabled only on Windows hosts.
    pub fn for_host() -> Self {
        Self {
            enforce_windows_reserved_names: cfg!(windows),
            ..Self::default()
        }
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement_character = replacement.into();
        self
    }

    pub fn with_excluded<I, S>(mut self, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_characters
            .extend(excluded.into_iter().map(Into::into));
        self
    }

    pub fn with_windows_reserved_names(mut self, enforce: bool) -> Self {
        self.enforce_windows_reserved_names = enforce;
        self
    }

    /// Parses and validates settings JSON.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` for malformed JSON and
    /// `SettingsError::InvalidReplacement` for an unsafe replacement.
    pub fn from_json(content: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(content).map_err(|e| SettingsError::Invalid(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects replacements that would reintroduce path separators, dots or
    /// control characters into the output, exclusions of path separators,
    /// and exclusions that are not exactly one character.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let replacement = &self.replacement_character;
        let unsafe_char = replacement
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '.') || c.is_control());

        if replacement.is_empty() || unsafe_char {
            return Err(SettingsError::InvalidReplacement(replacement.clone()));
        }

        for excluded in &self.excluded_characters {
            if excluded.chars().count() != 1 {
                return Err(SettingsError::Invalid(format!(
                    "excluded characters must be single characters, got {:?}",
                    excluded
                )));
            }
            if matches!(excluded.as_str(), "/" | "\\" | "\0") {
                return Err(SettingsError::Invalid(format!(
                    "{:?} cannot be excluded: it is never valid in a filename",
                    excluded
                )));
            }
        }
        Ok(())
    }

    pub fn is_excluded(&self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.excluded_characters.contains(&*c.encode_utf8(&mut buf))
    }
}

/// Capability that provides the settings snapshot for a batch operation.
pub trait SettingsLoader {
    fn load_settings(&self) -> SanitizerSettings;
    fn load_replace_patterns(&self) -> CompiledPatterns;
}

/// Loads both files from a base directory through a [`FileSystem`].
pub struct FolderSettingsLoader {
    fs: Rc<dyn FileSystem>,
    logger: Rc<dyn Logger>,
    base_dir: PathBuf,
}

impl FolderSettingsLoader {
    pub fn new(fs: Rc<dyn FileSystem>, logger: Rc<dyn Logger>, base_dir: &Path) -> Self {
        Self {
            fs,
            logger,
            base_dir: base_dir.to_path_buf(),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE_NAME)
    }

    pub fn replace_patterns_path(&self) -> PathBuf {
        self.base_dir.join(REPLACE_PATTERNS_FILE_NAME)
    }

    fn read_settings(&self, path: &Path) -> Result<SanitizerSettings, SettingsError> {
        if !self.fs.file_exists(path) {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }

        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| SettingsError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        SanitizerSettings::from_json(&content)
    }
}

impl SettingsLoader for FolderSettingsLoader {
    fn load_settings(&self) -> SanitizerSettings {
        let path = self.settings_path();
        match self.read_settings(&path) {
            Ok(settings) => {
                self.logger
                    .log_debug(&format!("Loaded settings from {}", path.display()));
                settings
            }
            Err(SettingsError::NotFound(_)) => {
                self.logger.log_debug(&format!(
                    "No settings file at {}, using defaults",
                    path.display()
                ));
                SanitizerSettings::default()
            }
            Err(e) => {
                self.logger.log_error_with_cause(
                    &format!("Error loading settings from {}, using defaults", path.display()),
                    &e,
                );
                SanitizerSettings::default()
            }
        }
    }

    fn load_replace_patterns(&self) -> CompiledPatterns {
        let path = self.replace_patterns_path();
        if !self.fs.file_exists(&path) {
            self.logger.log_debug(&format!(
                "No replace-patterns file at {}",
                path.display()
            ));
            return CompiledPatterns::default();
        }

        let content = match self.fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                self.logger.log_error_with_cause(
                    &format!("Error reading replace patterns from {}", path.display()),
                    &e,
                );
                return CompiledPatterns::default();
            }
        };

        let list = PatternList::from_pattern_file(&content);
        match list.compile() {
            Ok(compiled) => {
                self.logger.log_debug(&format!(
                    "Loaded {} replace pattern(s) from {}",
                    list.len(),
                    path.display()
                ));
                compiled
            }
            Err(e) => {
                self.logger.log_error_with_cause(
                    &format!("Ignoring replace patterns from {}", path.display()),
                    &e,
                );
                CompiledPatterns::default()
            }
        }
    }
}

/// Loader that hands out a fixed, in-memory snapshot.
#[derive(Debug, Clone, Default)]
pub struct FixedSettingsLoader {
    settings: SanitizerSettings,
    patterns: CompiledPatterns,
}

impl FixedSettingsLoader {
    pub fn new(settings: SanitizerSettings) -> Self {
        Self {
            settings,
            patterns: CompiledPatterns::default(),
        }
    }

    pub fn with_patterns(mut self, patterns: &PatternList) -> Result<Self, SettingsError> {
        self.patterns = patterns.compile()?;
        Ok(self)
    }
}

impl SettingsLoader for FixedSettingsLoader {
    fn load_settings(&self) -> SanitizerSettings {
        self.settings.clone()
    }

    fn load_replace_patterns(&self) -> CompiledPatterns {
        self.patterns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory::MemoryFileSystem;
    use crate::logging::RecordingLogger;

    const BASE: &str = "/custom/base/dir";

    fn loader_with(fs: MemoryFileSystem) -> (FolderSettingsLoader, Rc<RecordingLogger>) {
        let logger = Rc::new(RecordingLogger::default());
        let loader = FolderSettingsLoader::new(Rc::new(fs), logger.clone(), Path::new(BASE));
        (loader, logger)
    }

    #[test]
    fn test_defaults_when_file_does_not_exist() {
        let (loader, logger) = loader_with(MemoryFileSystem::with_dir(BASE));

        let settings = loader.load_settings();

        assert_eq!(settings, SanitizerSettings::default());
        assert_eq!(settings.replacement_character, default_replacement_character());
        assert!(settings.excluded_characters.is_empty());
        assert!(logger.errors.borrow().is_empty());
    }

    #[test]
    fn test_reads_settings_from_base_directory() {
        let fs = MemoryFileSystem::with_dir(BASE);
        fs.add_file(
            Path::new(BASE).join(SETTINGS_FILE_NAME),
            r##"{"ReplacementCharacter": "#", "ExcludedCharacters": ["-", "@"]}"##,
        );
        let (loader, _) = loader_with(fs);

        let settings = loader.load_settings();

        assert_eq!(settings.replacement_character, "#");
        assert!(settings.is_excluded('-'));
        assert!(settings.is_excluded('@'));
        assert!(!settings.is_excluded('$'));
        assert!(settings.enforce_windows_reserved_names);
    }

    #[test]
    fn test_invalid_json_logs_error_and_returns_defaults() {
        let fs = MemoryFileSystem::with_dir(BASE);
        fs.add_file(Path::new(BASE).join(SETTINGS_FILE_NAME), "not valid json");
        let (loader, logger) = loader_with(fs);

        let settings = loader.load_settings();

        assert_eq!(settings, SanitizerSettings::default());
        assert_eq!(logger.errors.borrow().len(), 1);
        assert!(logger.errors.borrow()[0].contains("Invalid settings"));
    }

    #[test]
    fn test_unsafe_replacement_is_rejected() {
        assert!(SanitizerSettings::from_json(r#"{"ReplacementCharacter": "/"}"#).is_err());
        assert!(SanitizerSettings::from_json(r#"{"ReplacementCharacter": ""}"#).is_err());
        assert!(SanitizerSettings::from_json(r#"{"ReplacementCharacter": "."}"#).is_err());
        assert!(SanitizerSettings::from_json(r#"{"ReplacementCharacter": "__"}"#).is_ok());
    }

    #[test]
    fn test_path_separators_cannot_be_excluded() {
        let result = SanitizerSettings::from_json(r#"{"ExcludedCharacters": ["/"]}"#);
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
        assert!(SanitizerSettings::from_json(r#"{"ExcludedCharacters": ["-"]}"#).is_ok());
    }

    #[test]
    fn test_excluded_entries_must_be_single_characters() {
        for json in [
            r#"{"ExcludedCharacters": ["ab"]}"#,
            r#"{"ExcludedCharacters": [""]}"#,
        ] {
            let result = SanitizerSettings::from_json(json);
            assert!(matches!(result, Err(SettingsError::Invalid(_))), "{}", json);
        }
        let settings = SanitizerSettings::from_json(r#"{"ExcludedCharacters": ["€"]}"#)
            .expect("Failed to parse settings");
        assert!(settings.is_excluded('€'));
    }

    #[test]
    fn test_multi_character_exclusion_file_falls_back_to_defaults() {
        let fs = MemoryFileSystem::with_dir(BASE);
        fs.add_file(
            Path::new(BASE).join(SETTINGS_FILE_NAME),
            r#"{"ReplacementCharacter": "_", "ExcludedCharacters": ["-@"]}"#,
        );
        let (loader, logger) = loader_with(fs);

        let settings = loader.load_settings();

        assert_eq!(settings, SanitizerSettings::default());
        assert_eq!(logger.errors.borrow().len(), 1);
        assert!(logger.errors.borrow()[0].contains("single characters"));
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let settings = SanitizerSettings::from_json(r#"{"EnforceWindowsReservedNames": false}"#)
            .expect("Failed to parse settings");

        assert_eq!(settings.replacement_character, default_replacement_character());
        assert!(!settings.enforce_windows_reserved_names);
    }

    #[test]
    fn test_host_settings_follow_platform() {
        assert_eq!(
            SanitizerSettings::for_host().enforce_windows_reserved_names,
            cfg!(windows)
        );
    }

    #[test]
    fn test_replace_patterns_loaded_from_base_directory() {
        let fs = MemoryFileSystem::with_dir(BASE);
        fs.add_file(
            Path::new(BASE).join(REPLACE_PATTERNS_FILE_NAME),
            "# remove site tags\n[www.example.com]\n\n",
        );
        let (loader, logger) = loader_with(fs);

        let patterns = loader.load_replace_patterns();

        assert!(!patterns.is_empty());
        assert_eq!(patterns.replace_all("song [WWW.EXAMPLE.COM].mp3", "_"), "song _.mp3");
        assert!(logger.errors.borrow().is_empty());
    }

    #[test]
    fn test_missing_replace_patterns_file_gives_no_patterns() {
        let (loader, _) = loader_with(MemoryFileSystem::with_dir(BASE));
        assert!(loader.load_replace_patterns().is_empty());
    }

    #[test]
    fn test_fixed_loader_returns_snapshot() {
        let settings = SanitizerSettings::default().with_replacement("_");
        let loader = FixedSettingsLoader::new(settings.clone())
            .with_patterns(&PatternList::new(vec!["x".to_string()]))
            .expect("Failed to compile patterns");

        assert_eq!(loader.load_settings(), settings);
        assert!(!loader.load_replace_patterns().is_empty());
    }
}
