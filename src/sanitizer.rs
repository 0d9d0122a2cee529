//! Filename sanitization.
//!
//! [`Sanitizer`] turns an arbitrary string, such as an object-storage key or a
//! name typed on another OS, into a filename that is valid on both Windows
//! and POSIX file systems. It does no I/O: settings and replace patterns are
//! handed to it as an immutable snapshot.
//!
//! One pass runs these steps in order:
//!
//! 1. trim surrounding whitespace
//! 2. replace invalid characters with the replacement string
//! 3. cap the length (extension-preserving)
//! 4. collapse runs of the replacement string
//! 5. re-trim, turn whitespace runs into the replacement, collapse dot runs,
//!    drop trailing dots
//! 6. strip control and other non-printable characters
//! 7. replace configured literal patterns (case-insensitive)
//! 8. strip replacement and whitespace runs around the extension dot
//! 9. prefix Windows device names with `_`
//! 10. cap the length again (extension-preserving)
//!
//! Later steps can expose work for earlier ones (step 8 can leave a `..`,
//! truncation can leave a trailing dot), so passes repeat until the name
//! stops changing. That makes `sanitize` idempotent. After the first pass a
//! name never grows except for the one-time reserved-name prefix, so the
//! loop ends; the pass count is bounded by the name length regardless.

use crate::patterns::CompiledPatterns;
use crate::settings::{SanitizerSettings, SettingsError};
use regex::{NoExpand, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

/// POSIX `NAME_MAX`, in bytes.
pub const MAX_NAME_LENGTH: usize = 255;

/// Windows device names, matched case-insensitively against the base name.
pub const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "LPT1", "LPT2", "LPT3", "LPT4",
];

/// Characters Windows refuses in a filename.
const WINDOWS_INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '\0'];

/// Characters that are legal on POSIX but need quoting in a shell.
const POSIX_UNSAFE_CHARS: &[char] = &[
    '!', '&', '(', ')', '{', '}', '[', ']', '<', '>', '|', '?', '=', '`', '\'', '¨', '~', '^', '*',
    '@', '£', '€', '$', ';', '-', '\0', '/', '\\',
];

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static DOT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}").expect("Invalid dot regex"));

// Unicode general category "Other": control, format, private use, unassigned.
static NON_PRINTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{C}+").expect("Invalid control character regex"));

/// Sanitizes filenames against one settings snapshot.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    settings: SanitizerSettings,
    patterns: CompiledPatterns,
    invalid_chars: HashSet<char>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        let settings = SanitizerSettings::default();
        Self {
            invalid_chars: invalid_char_set(&settings),
            settings,
            patterns: CompiledPatterns::default(),
        }
    }
}

impl Sanitizer {
    /// Creates a sanitizer for the given settings and replace patterns.
    ///
    /// The invalid-character set is fixed here: the built-in Windows and POSIX
    /// sets, minus every character of the replacement string, minus the
    /// excluded characters.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidReplacement` if the replacement string
    /// is empty or contains a path separator, a dot or a control character.
    pub fn new(
        settings: SanitizerSettings,
        patterns: CompiledPatterns,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            invalid_chars: invalid_char_set(&settings),
            settings,
            patterns,
        })
    }

    /// Creates a sanitizer without replace patterns.
    pub fn with_settings(settings: SanitizerSettings) -> Result<Self, SettingsError> {
        Self::new(settings, CompiledPatterns::default())
    }

    pub fn settings(&self) -> &SanitizerSettings {
        &self.settings
    }

    /// Sanitizes a filename. Empty or whitespace-only input gives `""`.
    ///
    /// An empty result means no safe name could be derived.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesanitizer::{SanitizerSettings, Sanitizer};
    ///
    /// let settings = SanitizerSettings::default().with_replacement("_");
    /// let sanitizer = Sanitizer::with_settings(settings).unwrap();
    ///
    /// assert_eq!(sanitizer.sanitize("test:file.txt"), "test_file.txt");
    /// assert_eq!(sanitizer.sanitize("COM1.txt"), "_COM1.txt");
    /// assert_eq!(sanitizer.sanitize("file....txt"), "file.txt");
    /// ```
    pub fn sanitize(&self, file_name: &str) -> String {
        self.sanitize_or(Some(file_name), "")
    }

    /// Sanitizes a filename, returning `fallback` when the input is absent,
    /// empty or whitespace-only.
    ///
    /// The fallback is only used for blank input; a non-blank input that
    /// sanitizes down to nothing still returns `""`.
    pub fn sanitize_or(&self, file_name: Option<&str>, fallback: &str) -> String {
        let Some(file_name) = file_name.filter(|name| !name.trim().is_empty()) else {
            return fallback.to_string();
        };

        let mut current = self.pass(file_name);
        for _ in 0..=current.len() + 1 {
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Sanitizes the last component of a key such as `photos/2024/a:b.jpg`.
    ///
    /// Both `/` and `\` count as folder separators.
    pub fn sanitize_key(&self, key: &str) -> String {
        let file_name = key.rsplit(['/', '\\']).next().unwrap_or(key);
        self.sanitize(file_name)
    }

    /// True when sanitizing `file_name` would not change it.
    pub fn is_sanitized(&self, file_name: &str) -> bool {
        self.sanitize(file_name) == file_name
    }

    fn pass(&self, file_name: &str) -> String {
        let replacement = self.settings.replacement_character.as_str();

        let name = self.replace_invalid_chars(file_name.trim());
        let name = truncate_preserving_extension(&name, MAX_NAME_LENGTH);
        let name = collapse_runs(&name, replacement);

        let name = WHITESPACE_RUN.replace_all(name.trim(), NoExpand(replacement));
        let name = DOT_RUN.replace_all(&name, ".");
        let name = name.trim_end_matches('.');

        let name = NON_PRINTABLE.replace_all(name, "");
        let name = self.patterns.replace_all(&name, replacement);
        let name = tidy_extension_separator(&name, replacement);

        let name = if self.settings.enforce_windows_reserved_names
            && is_windows_reserved_name(&name)
        {
            format!("_{}", name)
        } else {
            name
        };

        truncate_preserving_extension(&name, MAX_NAME_LENGTH)
    }

    fn replace_invalid_chars(&self, name: &str) -> String {
        let replacement = self.settings.replacement_character.as_str();
        let mut output = String::with_capacity(name.len());
        for c in name.chars() {
            if self.invalid_chars.contains(&c) {
                output.push_str(replacement);
            } else {
                output.push(c);
            }
        }
        output
    }
}

fn invalid_char_set(settings: &SanitizerSettings) -> HashSet<char> {
    WINDOWS_INVALID_CHARS
        .iter()
        .chain(POSIX_UNSAFE_CHARS)
        .copied()
        .filter(|&c| !settings.replacement_character.contains(c) && !settings.is_excluded(c))
        .collect()
}

/// True if the base name (without extension) is a Windows device name.
pub fn is_windows_reserved_name(file_name: &str) -> bool {
    let (base, _) = split_extension(file_name);
    WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(base))
}

/// Splits `name.ext` into `("name", ".ext")`.
///
/// A trailing dot is not an extension; a leading dot is (`.bashrc` has an
/// empty base).
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() => file_name.split_at(dot),
        _ => (file_name, ""),
    }
}

/// Caps `file_name` at `max_len` bytes, cutting the base name so that the
/// extension survives. Falls back to a plain cut when the extension alone is
/// too long.
pub fn truncate_preserving_extension(file_name: &str, max_len: usize) -> String {
    if file_name.len() <= max_len {
        return file_name.to_string();
    }

    let (base, extension) = split_extension(file_name);
    if extension.len() >= max_len {
        return truncate_at_char_boundary(file_name, max_len).to_string();
    }

    let base = truncate_at_char_boundary(base, max_len - extension.len());
    format!("{}{}", base, extension)
}

fn truncate_at_char_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn collapse_runs(input: &str, unit: &str) -> String {
    if unit.is_empty() {
        return input.to_string();
    }
    let doubled = unit.repeat(2);
    let mut output = input.to_string();
    while output.contains(&doubled) {
        output = output.replace(&doubled, unit);
    }
    output
}

/// Removes replacement and whitespace runs on both sides of the last dot.
fn tidy_extension_separator(file_name: &str, replacement: &str) -> String {
    let Some(dot) = file_name.rfind('.') else {
        return file_name.to_string();
    };

    let base = trim_end_junk(&file_name[..dot], replacement);
    let extension = trim_start_junk(&file_name[dot + 1..], replacement);
    format!("{}.{}", base, extension)
}

fn trim_end_junk<'a>(mut s: &'a str, replacement: &str) -> &'a str {
    loop {
        let before = s.len();
        s = s.trim_end();
        if !replacement.is_empty() {
            while let Some(rest) = s.strip_suffix(replacement) {
                s = rest;
            }
        }
        if s.len() == before {
            return s;
        }
    }
}

fn trim_start_junk<'a>(mut s: &'a str, replacement: &str) -> &'a str {
    loop {
        let before = s.len();
        s = s.trim_start();
        if !replacement.is_empty() {
            while let Some(rest) = s.strip_prefix(replacement) {
                s = rest;
            }
        }
        if s.len() == before {
            return s;
        }
    }
}
