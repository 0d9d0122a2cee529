//! Literal substring patterns.
//!
//! Patterns come from two places:
//! - the replace-patterns file next to the settings (`#` comments, blank lines
//!   ignored, entries trimmed), applied during sanitization, and
//! - the pattern-removal mode of the CLI (newline-delimited, only empty lines
//!   ignored, entries kept verbatim so a lone space is a valid pattern).
//!
//! Matching is always literal and case-insensitive.

use crate::settings::SettingsError;
use regex::{NoExpand, Regex, RegexBuilder};

/// Uncompiled list of literal patterns, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternList {
    patterns: Vec<String>,
}

impl PatternList {
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns: patterns.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    /// Parses the contents of a replace-patterns file.
    ///
    /// A line is a comment only when `#` is its very first character; an
    /// indented `#` is part of the pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesanitizer::PatternList;
    ///
    /// let list = PatternList::from_pattern_file("# junk\n\n  (copy)  \n[draft]\n");
    /// assert_eq!(list.as_slice(), ["(copy)", "[draft]"]);
    /// ```
    pub fn from_pattern_file(content: &str) -> Self {
        Self {
            patterns: content
                .lines()
                .filter(|line| !line.starts_with('#'))
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Parses a newline-delimited list where only empty lines are dropped.
    pub fn from_lines(content: &str) -> Self {
        Self {
            patterns: content
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.patterns
    }

    /// Builds case-insensitive literal matchers for every pattern.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidPattern` if a pattern is too large to
    /// compile.
    pub fn compile(&self) -> Result<CompiledPatterns, SettingsError> {
        let matchers = self
            .patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(&regex::escape(pattern))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| SettingsError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledPatterns { matchers })
    }
}

/// Compiled matchers, applied one after the other.
#[derive(Debug, Clone, Default)]
pub struct CompiledPatterns {
    matchers: Vec<Regex>,
}

impl CompiledPatterns {
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Replaces every occurrence of every pattern with `replacement`.
    ///
    /// Each pattern sees the output of the previous one.
    pub fn replace_all(&self, input: &str, replacement: &str) -> String {
        self.matchers
            .iter()
            .fold(input.to_string(), |current, matcher| {
                matcher
                    .replace_all(&current, NoExpand(replacement))
                    .into_owned()
            })
    }

    pub fn remove_all(&self, input: &str) -> String {
        self.replace_all(input, "")
    }
}
