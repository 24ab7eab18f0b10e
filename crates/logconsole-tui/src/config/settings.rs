use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

use logconsole_core::ConsoleOptions;

/// Errors reading the settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown capture level '{0}'")]
    InvalidLevel(String),
}

/// Settings file contents; every key is optional
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub console: ConsoleSettings,
    pub capture: CaptureSettings,
    pub display: DisplaySettings,
    pub export: ExportSettings,
}

impl Settings {
    /// Read settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Initial console configuration
    pub fn console_options(&self) -> ConsoleOptions {
        ConsoleOptions {
            collapsed: self.console.collapsed,
            info_enabled: self.console.show_info,
            warning_enabled: self.console.show_warning,
            error_enabled: self.console.show_error,
            pattern: self.console.filter.clone(),
            case_insensitive: self.console.case_insensitive,
            ..Default::default()
        }
    }

    /// Lowest tracing level forwarded to the console
    pub fn capture_level(&self) -> Result<Level, SettingsError> {
        self.capture
            .level
            .parse()
            .map_err(|_| SettingsError::InvalidLevel(self.capture.level.clone()))
    }
}

/// `[console]` section
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub collapsed: bool,
    pub show_info: bool,
    pub show_warning: bool,
    pub show_error: bool,
    pub filter: String,
    pub case_insensitive: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            collapsed: false,
            show_info: true,
            show_warning: true,
            show_error: true,
            filter: String::new(),
            case_insensitive: false,
        }
    }
}

/// `[capture]` section
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub level: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[display]` section
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub show_timestamps: bool,
    pub auto_scroll: bool,
    pub use_local_time: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            auto_scroll: true,
            use_local_time: true,
        }
    }
}

/// Export file format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "log",
            Self::Json => "jsonl",
        }
    }
}

/// `[export]` section
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub format: ExportFormat,
    /// Directory for exported files (current directory if unset)
    pub directory: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        let options = settings.console_options();
        assert!(!options.collapsed);
        assert!(options.info_enabled && options.warning_enabled && options.error_enabled);
        assert_eq!(settings.capture_level().unwrap(), Level::INFO);
        assert!(settings.display.auto_scroll);
        assert_eq!(settings.export.format, ExportFormat::Text);
    }

    #[test]
    fn test_partial_sections() {
        let settings = Settings::from_toml_str(
            r#"
            [console]
            collapsed = true
            show_info = false
            filter = "timeout|refused"

            [capture]
            level = "warn"

            [export]
            format = "json"
            "#,
        )
        .unwrap();

        let options = settings.console_options();
        assert!(options.collapsed);
        assert!(!options.info_enabled);
        assert!(options.error_enabled);
        assert_eq!(options.pattern, "timeout|refused");
        assert_eq!(settings.capture_level().unwrap(), Level::WARN);
        assert_eq!(settings.export.format.extension(), "jsonl");
    }

    #[test]
    fn test_invalid_level() {
        let settings = Settings::from_toml_str("[capture]\nlevel = \"loud\"").unwrap();
        assert!(matches!(
            settings.capture_level(),
            Err(SettingsError::InvalidLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Settings::from_toml_str("[console\ncollapsed = true"),
            Err(SettingsError::Parse(_))
        ));
    }
}
