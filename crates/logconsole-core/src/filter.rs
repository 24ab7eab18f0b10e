use regex::{Regex, RegexBuilder};

use logconsole_types::{Entry, Severity};

use crate::ConsoleError;

/// Compiled text filter for log messages
#[derive(Clone)]
pub struct CompiledFilter {
    /// Regex pattern (if any)
    regex: Option<Regex>,

    /// Original pattern string
    pattern: String,

    /// Case sensitivity
    case_insensitive: bool,
}

impl CompiledFilter {
    /// Compile a pattern; the empty pattern matches everything
    pub fn new(pattern: &str, case_insensitive: bool) -> Result<Self, ConsoleError> {
        let regex = if pattern.is_empty() {
            None
        } else {
            let compiled = RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|source| ConsoleError::InvalidFilterPattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
            Some(compiled)
        };

        Ok(Self {
            regex,
            pattern: pattern.to_string(),
            case_insensitive,
        })
    }

    /// A filter without a text pattern
    pub fn none() -> Self {
        Self {
            regex: None,
            pattern: String::new(),
            case_insensitive: false,
        }
    }

    /// Search the pattern anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(text),
            None => true,
        }
    }

    /// Find all match positions in a string (for highlighting)
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.regex {
            Some(re) => re
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .map(|m| (m.start(), m.end()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Get the original pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check if filter has a text pattern
    pub fn has_pattern(&self) -> bool {
        self.regex.is_some()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }
}

impl Default for CompiledFilter {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("pattern", &self.pattern)
            .field("case_insensitive", &self.case_insensitive)
            .finish()
    }
}

/// Severity selection plus optional text filter
#[derive(Clone, Debug)]
pub struct FilterConfig {
    pub info_enabled: bool,
    pub warning_enabled: bool,
    pub error_enabled: bool,
    pub text: CompiledFilter,
}

impl FilterConfig {
    pub fn severity_enabled(&self, severity: Severity) -> bool {
        match severity {
            Severity::Info => self.info_enabled,
            Severity::Warning => self.warning_enabled,
            Severity::Error => self.error_enabled,
        }
    }

    pub(crate) fn set_severity_enabled(&mut self, severity: Severity, enabled: bool) {
        match severity {
            Severity::Info => self.info_enabled = enabled,
            Severity::Warning => self.warning_enabled = enabled,
            Severity::Error => self.error_enabled = enabled,
        }
    }

    /// Check whether an entry should be shown under this configuration
    ///
    /// The severity gate is evaluated first; the text pattern is searched
    /// in the message only.
    pub fn passes(&self, entry: &Entry) -> bool {
        if !self.severity_enabled(entry.severity()) {
            return false;
        }
        self.text.is_match(entry.message())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            info_enabled: true,
            warning_enabled: true,
            error_enabled: true,
            text: CompiledFilter::none(),
        }
    }
}
